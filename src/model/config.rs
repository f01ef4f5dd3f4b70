use serde::{Deserialize, Serialize};

/// Configuration from tasklists.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub undo: UndoConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Substrate key the document is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoConfig {
    /// How long a deleted task stays recoverable
    #[serde(default = "default_undo_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UndoConfig {
    fn default() -> Self {
        UndoConfig {
            timeout_ms: default_undo_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// flexi_logger spec string ("warn", "info", "tasklists=debug", ...)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

pub const DEFAULT_STORAGE_KEY: &str = "multiTodo_v1";

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_undo_timeout_ms() -> u64 {
    crate::ops::undo::UNDO_TIMEOUT_MS
}

fn default_log_level() -> String {
    "warn".to_string()
}
