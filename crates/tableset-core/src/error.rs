//! Error type for translation, mapping and table set operations.

/// Errors raised by the query translator, the schema mapper and `TableSet`.
///
/// Nothing in this crate recovers from or retries any of these; they are
/// surfaced to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A required argument was absent.
    #[error("value cannot be null: {name}")]
    NullArgument {
        /// Name of the missing argument.
        name: String,
    },
    /// A call did not match the expected method identity or argument shape.
    #[error("argument out of range: {parameter}: {message}")]
    OutOfRange {
        /// The offending parameter.
        parameter: String,
        /// Explanation.
        message: String,
    },
    /// A cardinality constraint was violated by the returned sequence.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Explanation.
        message: String,
    },
    /// An expression node or data kind has no defined lowering.
    #[error("unsupported construct: {construct}")]
    Unsupported {
        /// Description of the offending construct.
        construct: String,
    },
    /// A type's declared mapping or a returned row violates the schema.
    #[error("mapping integrity error for {type_name}: {message}")]
    MappingIntegrity {
        /// The record type.
        type_name: String,
        /// Explanation.
        message: String,
    },
    /// The storage collaborator failed.
    #[error("storage request failed: {0}")]
    Storage(#[from] anyhow::Error),
}

impl TableError {
    /// Create a `NullArgument` error.
    #[must_use]
    pub fn null_argument(name: impl Into<String>) -> Self {
        Self::NullArgument { name: name.into() }
    }

    /// Create an `OutOfRange` error.
    #[must_use]
    pub fn out_of_range(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an `InvalidOperation` error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an `Unsupported` error.
    #[must_use]
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
        }
    }

    /// Create a `MappingIntegrity` error.
    #[must_use]
    pub fn mapping_integrity(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MappingIntegrity {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// Convenience result type.
pub type Result<T, E = TableError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_out_of_range_message() {
        let err = TableError::out_of_range("method", "expected First, got FirstOrDefault");
        assert_eq!(
            err.to_string(),
            "argument out of range: method: expected First, got FirstOrDefault"
        );
    }

    #[test]
    fn test_should_wrap_storage_error() {
        let err: TableError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, TableError::Storage(_)));
    }
}
