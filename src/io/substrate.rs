use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for substrate reads and writes
#[derive(Debug, thiserror::Error)]
pub enum SubstrateError {
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid storage key {0:?}: use letters, digits, '.', '-' or '_'")]
    InvalidKey(String),
}

/// Synchronous key-value byte store. Each value is read and written whole;
/// a `set` either lands completely or not at all.
pub trait Substrate {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), SubstrateError>;
    /// Remove a key. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SubstrateError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemorySubstrate {
    values: HashMap<String, Vec<u8>>,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a value, as if an earlier session had written it
    pub fn with_value(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// The stored bytes for `key`
    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }
}

impl Substrate for MemorySubstrate {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), SubstrateError> {
        self.values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SubstrateError> {
        self.values.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Directory of files, one per key
// ---------------------------------------------------------------------------

/// Stores each key as `<dir>/<key>.json`. Writes go through a temp file and
/// a rename so readers never observe a half-written value.
#[derive(Debug, Clone)]
pub struct FileSubstrate {
    dir: PathBuf,
}

impl FileSubstrate {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSubstrate { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, SubstrateError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(SubstrateError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Substrate for FileSubstrate {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SubstrateError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), SubstrateError> {
        let path = self.path_for(key)?;
        atomic_write(&path, value).map_err(|source| SubstrateError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), SubstrateError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SubstrateError::Io { path, source }),
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
