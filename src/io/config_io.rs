use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Directory (under the project root) that holds config and data
pub const DATA_DIR: &str = ".tasklists";
pub const CONFIG_FILE: &str = "tasklists.toml";

pub const CONFIG_TEMPLATE: &str = r##"# tasklists configuration

[storage]
# Key the document is stored under (<key>.json in this directory)
key = "multiTodo_v1"

[undo]
# How long `tl undo` can bring back a deleted task
timeout_ms = 6000

[log]
# error | warn | info | debug | trace, or a module spec like "tasklists=debug"
level = "warn"
"##;

/// Error type for config and data-directory I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no .tasklists/ directory found (run `tl init` first)")]
    NotInitialized,
    #[error(".tasklists/ already exists in {}", .0.display())]
    AlreadyInitialized(PathBuf),
    #[error("could not read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse tasklists.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` to the first directory containing `.tasklists/`.
/// Returns that data directory.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR);
        if data_dir.is_dir() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(ConfigError::NotInitialized);
        }
    }
}

/// Create `.tasklists/` with a commented default config under `root`.
pub fn init_data_dir(root: &Path) -> Result<PathBuf, ConfigError> {
    let data_dir = root.join(DATA_DIR);
    if data_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(root.to_path_buf()));
    }
    fs::create_dir_all(&data_dir)?;
    fs::write(data_dir.join(CONFIG_FILE), CONFIG_TEMPLATE)?;
    Ok(data_dir)
}

/// Read the config. A missing file means all defaults.
pub fn read_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    Ok(toml::from_str(&text)?)
}
