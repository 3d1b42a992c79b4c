use std::collections::HashSet;
use std::fmt;

use tableset_model::{DataKind, ETAG, PARTITION_KEY, ROW_KEY, TIMESTAMP, is_reserved};

use crate::error::{Result, TableError};
use crate::expression::NameResolver;

/// Reserved column roles a field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedRole {
    /// Partition key.
    PartitionKey,
    /// Row key within a partition.
    RowKey,
    /// Server-maintained modification time.
    Timestamp,
    /// Optimistic concurrency token.
    ETag,
}

impl ReservedRole {
    /// Column the role is stored under.
    #[must_use]
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::PartitionKey => PARTITION_KEY,
            Self::RowKey => ROW_KEY,
            Self::Timestamp => TIMESTAMP,
            Self::ETag => ETAG,
        }
    }

    /// Data kind of the role's column.
    #[must_use]
    pub fn data_kind(&self) -> DataKind {
        match self {
            Self::Timestamp => DataKind::DateTime,
            Self::PartitionKey | Self::RowKey | Self::ETag => DataKind::String,
        }
    }
}

impl fmt::Display for ReservedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Per-field configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Reserved role, if any.
    pub role: Option<ReservedRole>,
    /// Excluded from storage in both directions.
    pub ignored: bool,
    /// Column name override.
    pub column: Option<String>,
}

/// One field of a [`ColumnMapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Serialized member name.
    pub field_name: String,
    /// Storage column name.
    pub column_name: String,
    /// Storage kind; `None` only for ignored fields.
    pub data_kind: Option<DataKind>,
    /// Reserved role, if any.
    pub role: Option<ReservedRole>,
    /// Whether the field is excluded from storage.
    pub ignored: bool,
}

/// Validated mapping of one record type. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    type_name: String,
    fields: Vec<FieldMapping>,
}

impl ColumnMapping {
    /// Name of the mapped type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Look up a field by its member name.
    #[must_use]
    pub fn field(&self, field_name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// The field holding `role`.
    #[must_use]
    pub fn by_role(&self, role: ReservedRole) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.role == Some(role))
    }

    /// Stored (non-ignored) fields.
    pub fn stored_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(|f| !f.ignored)
    }

    /// Name table for the filter translator: every stored field whose
    /// column differs from its member name.
    #[must_use]
    pub fn name_resolver(&self) -> NameResolver {
        self.stored_fields()
            .filter(|f| f.field_name != f.column_name)
            .map(|f| (f.field_name.clone(), f.column_name.clone()))
            .collect()
    }
}

/// Collects field declarations and validates them into a [`ColumnMapping`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    type_name: String,
    declared: Vec<(String, Option<DataKind>, FieldOptions)>,
}

impl SchemaBuilder {
    /// Start a mapping for `type_name`.
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_owned(),
            declared: Vec::new(),
        }
    }

    fn role(&mut self, field: &str, role: ReservedRole) -> &mut Self {
        let options = FieldOptions {
            role: Some(role),
            ..FieldOptions::default()
        };
        self.declared
            .push((field.to_owned(), Some(role.data_kind()), options));
        self
    }

    /// Declare the partition key field.
    pub fn partition_key(&mut self, field: &str) -> &mut Self {
        self.role(field, ReservedRole::PartitionKey)
    }

    /// Declare the row key field.
    pub fn row_key(&mut self, field: &str) -> &mut Self {
        self.role(field, ReservedRole::RowKey)
    }

    /// Declare the timestamp field.
    pub fn timestamp(&mut self, field: &str) -> &mut Self {
        self.role(field, ReservedRole::Timestamp)
    }

    /// Declare the concurrency token field.
    pub fn etag(&mut self, field: &str) -> &mut Self {
        self.role(field, ReservedRole::ETag)
    }

    /// Declare a plain property stored under its own name.
    pub fn property(&mut self, field: &str, kind: DataKind) -> &mut Self {
        self.field(field, kind, FieldOptions::default())
    }

    /// Declare a plain property stored under `column`.
    pub fn property_as(&mut self, field: &str, kind: DataKind, column: &str) -> &mut Self {
        let options = FieldOptions {
            column: Some(column.to_owned()),
            ..FieldOptions::default()
        };
        self.field(field, kind, options)
    }

    /// Declare a member that is never stored.
    pub fn ignore(&mut self, field: &str) -> &mut Self {
        let options = FieldOptions {
            ignored: true,
            ..FieldOptions::default()
        };
        self.declared.push((field.to_owned(), None, options));
        self
    }

    /// Declare a field with explicit options.
    pub fn field(&mut self, field: &str, kind: DataKind, options: FieldOptions) -> &mut Self {
        self.declared.push((field.to_owned(), Some(kind), options));
        self
    }

    /// Validate the declarations.
    ///
    /// # Errors
    ///
    /// `MappingIntegrity` on a duplicate field, role or column, on a role
    /// declared with the wrong kind or an override, on an ignored role field,
    /// or when the partition or row key is missing.
    pub fn build(self) -> Result<ColumnMapping> {
        let type_name = self.type_name;
        let fail = |message: String| TableError::mapping_integrity(type_name.clone(), message);

        let mut field_names = HashSet::new();
        let mut columns = HashSet::new();
        let mut roles = HashSet::new();
        let mut fields = Vec::with_capacity(self.declared.len());

        for (field_name, data_kind, options) in self.declared {
            if !field_names.insert(field_name.clone()) {
                return Err(fail(format!("field `{field_name}` is declared twice")));
            }
            if options.ignored {
                if let Some(role) = options.role {
                    return Err(fail(format!("{role} field `{field_name}` cannot be ignored")));
                }
                fields.push(FieldMapping {
                    column_name: field_name.clone(),
                    field_name,
                    data_kind: None,
                    role: None,
                    ignored: true,
                });
                continue;
            }

            let column_name = match options.role {
                Some(role) => {
                    if !roles.insert(role) {
                        return Err(fail(format!("{role} is assigned to more than one field")));
                    }
                    if data_kind != Some(role.data_kind()) {
                        return Err(fail(format!(
                            "{role} field `{field_name}` must be {}",
                            role.data_kind()
                        )));
                    }
                    if options.column.as_deref().is_some_and(|c| c != role.column_name()) {
                        return Err(fail(format!(
                            "{role} field `{field_name}` cannot override its column"
                        )));
                    }
                    role.column_name().to_owned()
                }
                None => {
                    let column = options.column.unwrap_or_else(|| field_name.clone());
                    if is_reserved(&column) {
                        return Err(fail(format!(
                            "field `{field_name}` maps to reserved column `{column}` without its role"
                        )));
                    }
                    column
                }
            };
            if !columns.insert(column_name.clone()) {
                return Err(fail(format!("column `{column_name}` is mapped twice")));
            }
            fields.push(FieldMapping {
                field_name,
                column_name,
                data_kind,
                role: options.role,
                ignored: false,
            });
        }

        for required in [ReservedRole::PartitionKey, ReservedRole::RowKey] {
            if !roles.contains(&required) {
                return Err(fail(format!("no field is declared as {required}")));
            }
        }

        Ok(ColumnMapping { type_name, fields })
    }
}
