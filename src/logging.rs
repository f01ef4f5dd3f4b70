//! Logger bootstrap for the binary.
//!
//! The library only emits through the `log` facade; nothing is printed
//! unless the host installs a logger. `tl` routes records to stderr at the
//! level from `tasklists.toml`.

use std::sync::OnceLock;

use flexi_logger::{Logger, LoggerHandle};

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Start stderr logging with a flexi_logger spec ("warn", "tasklists=debug", ...).
///
/// Only the first successful call takes effect; later calls are ignored.
/// Never panics: a bad level string or a backend failure comes back as an error.
pub fn init_logging(spec: &str) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let handle = Logger::try_with_str(spec)
        .map_err(|err| format!("invalid log level `{}`: {}", spec, err))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {}", err))?;
    let _ = LOGGER.set(handle);
    log::debug!(
        "logging started level={} version={}",
        spec,
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_level() {
        // parse failure is reported before any global state is touched
        if LOGGER.get().is_none() {
            assert!(init_logging("tasklists=notalevel").is_err());
        }
    }
}
