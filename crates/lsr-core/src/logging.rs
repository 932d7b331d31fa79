//! Process-wide logging bootstrap.
//!
//! The library itself only emits `log` records.  [`init_logging`] starts a
//! `flexi_logger` stderr backend for binaries and test harnesses that want
//! to see them.
//!
//! # Invariants
//! - Initialization happens at most once per process.
//! - Repeating the call with the same spec is a no-op.
//! - A different spec after initialization is rejected.
//! - Initialization never panics.

use flexi_logger::{Logger, LoggerHandle};
use log::info;
use once_cell::sync::OnceCell;

use crate::errors::{Error, Result};

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    spec: String,
    _logger: LoggerHandle,
}

/// Start stderr logging with a `flexi_logger` spec such as `"debug"` or
/// `"info, lsr_strategies=trace"`.
///
/// # Errors
/// - [`Error::InvalidConfig`] when `spec` cannot be parsed, or when logging
///   is already running with a different spec.
/// - [`Error::Runtime`] when the backend fails to start (for instance
///   because another global logger is installed).
pub fn init_logging(spec: &str) -> Result<()> {
    let spec = spec.trim();
    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState> {
        let logger = Logger::try_with_str(spec)
            .map_err(|err| Error::InvalidConfig(format!("invalid log spec `{spec}`: {err}")))?
            .log_to_stderr()
            .format(flexi_logger::detailed_format)
            .start()
            .map_err(|err| Error::Runtime(format!("failed to start logger: {err}")))?;
        info!("logging initialized spec={spec}");
        Ok(LoggingState {
            spec: spec.to_string(),
            _logger: logger,
        })
    })?;

    if state.spec != spec {
        return Err(Error::InvalidConfig(format!(
            "logging already initialized with `{}`; refusing to switch to `{spec}`",
            state.spec
        )));
    }
    Ok(())
}

/// The active log spec, or `None` before [`init_logging`] succeeded.
pub fn logging_status() -> Option<&'static str> {
    LOGGING_STATE.get().map(|state| state.spec.as_str())
}
