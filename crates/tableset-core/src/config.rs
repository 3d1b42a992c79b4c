//! Table set configuration.

use std::env;

/// Configuration shared by every `TableSet`.
#[derive(Debug, Clone)]
pub struct TableSetConfig {
    /// Maximum number of entities requested per segment.
    pub page_size: u32,
    /// Optional ceiling for `Take(n)`; larger counts are rejected.
    pub max_take: Option<u32>,
    /// Emit translated filters at debug level.
    pub log_filters: bool,
}

impl TableSetConfig {
    /// Default number of entities per segment.
    pub const DEFAULT_PAGE_SIZE: u32 = 1000;

    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            page_size: env::var("TABLESET_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(Self::DEFAULT_PAGE_SIZE),
            max_take: env::var("TABLESET_MAX_TAKE")
                .ok()
                .and_then(|v| v.parse().ok()),
            log_filters: env_bool("TABLESET_LOG_FILTERS", true),
        }
    }
}

impl Default for TableSetConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            max_take: None,
            log_filters: true,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
