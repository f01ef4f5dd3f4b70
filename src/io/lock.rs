use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = ".lock";
const RETRY_INTERVAL: Duration = Duration::from_millis(10);
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Exclusive advisory lock on a data directory, held for the lifetime of
/// the value. Two `tl` processes writing the same directory take turns.
///
/// The `.lock` file is never removed: a waiter may already hold it open, and
/// unlinking it would let a later process lock a fresh inode alongside it.
/// Dropping the value closes the file, which releases the flock.
pub struct DirLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {}: another tl process is writing", path.display())]
    Timeout { path: PathBuf },
}

impl DirLock {
    /// Block up to `timeout` for the lock on `data_dir`.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while try_lock(&file).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
        Ok(DirLock { _file: file })
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_LOCK_TIMEOUT)
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_is_reacquirable_after_drop() {
        let tmp = TempDir::new().unwrap();
        let lock = DirLock::acquire_default(tmp.path()).unwrap();
        assert!(tmp.path().join(LOCK_FILE).exists());
        drop(lock);
        assert!(tmp.path().join(LOCK_FILE).exists());
        assert!(DirLock::acquire_default(tmp.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn second_lock_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = DirLock::acquire_default(tmp.path()).unwrap();
        let second = DirLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn handoff_to_waiter_stays_exclusive() {
        let tmp = TempDir::new().unwrap();
        let first = DirLock::acquire_default(tmp.path()).unwrap();

        let dir = tmp.path().to_path_buf();
        let waiter = std::thread::spawn(move || DirLock::acquire(&dir, Duration::from_secs(5)));
        // let the waiter open the lock file before it is released
        std::thread::sleep(Duration::from_millis(100));
        drop(first);

        let second = waiter.join().unwrap().unwrap();
        let third = DirLock::acquire(tmp.path(), Duration::from_millis(100));
        assert!(matches!(third, Err(LockError::Timeout { .. })));
        drop(second);
        assert!(DirLock::acquire_default(tmp.path()).is_ok());
    }

    #[test]
    fn missing_dir_is_an_open_error() {
        let tmp = TempDir::new().unwrap();
        let result = DirLock::acquire_default(&tmp.path().join("nope"));
        assert!(matches!(result, Err(LockError::Open { .. })));
    }
}
