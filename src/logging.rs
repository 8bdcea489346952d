//! Logging bootstrap for the `note` binary.
//!
//! The library only talks to the `log` facade. The binary starts
//! `flexi_logger` on stderr with `LEVEL: message` lines so log output never
//! mixes with tables printed on stdout.

use flexi_logger::{DeferredNow, Logger, LoggerHandle};
use log::Record;

/// Start stderr logging at `level`. Keep the handle alive for the whole run.
///
/// # Errors
/// - Returns an error when `level` is not one of `error|warn|info|debug|trace`.
/// - Returns an error when the logger backend cannot start.
pub fn init_logging(level: &str) -> Result<LoggerHandle, String> {
    let level = normalize_level(level)?;
    Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .format(line_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" | "critical" => Ok("error"),
        "warn" | "warning" => Ok("warn"),
        "info" => Ok("info"),
        "debug" => Ok("debug"),
        "trace" => Ok("trace"),
        other => Err(format!(
            "unsupported log level `{other}` (use error, warn, info, debug or trace)"
        )),
    }
}

fn line_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(w, "{}: {}", record.level(), record.args())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO"), Ok("info"));
        assert_eq!(normalize_level(" warning "), Ok("warn"));
        assert_eq!(normalize_level("CRITICAL"), Ok("error"));
        assert!(normalize_level("loud").is_err());
    }
}
