//! Process-wide, level-filtered, callback-based log sink.
//!
//! The library reports events through [`log_message`]. A message reaches the
//! registered callback only when a callback is installed and the message
//! level is at or above the current minimum. Library-internal events are also
//! forwarded to the `log` facade so `env_logger` users see them.
//!
//! State is owned by a [`LoggingSession`] obtained from [`init`]; dropping the
//! session (or calling [`reset`]) clears the callback and restores the default
//! minimum level.

use crate::errors::ControlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

/// Severity of a log event, ordered from least to most severe.
///
/// Deserializes from the variant name as well as the `Display`/`FromStr`
/// spellings, so config files may use either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(alias = "DEBUG", alias = "debug")]
    Debug = 0,
    #[serde(alias = "INFO", alias = "info")]
    Info = 1,
    #[serde(alias = "WARNING", alias = "warning", alias = "WARN", alias = "warn")]
    Warning = 2,
    #[serde(alias = "ERROR", alias = "error")]
    Error = 3,
    #[serde(alias = "CRITICAL", alias = "critical")]
    Critical = 4,
}

impl LogLevel {
    pub const DEFAULT: LogLevel = LogLevel::Info;

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Matching `log` crate level. `Critical` has no counterpart and maps to `Error`.
    pub fn as_log_level(&self) -> log::Level {
        match self {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error | LogLevel::Critical => log::Level::Error,
        }
    }

    fn from_u8(raw: u8) -> LogLevel {
        match raw {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warning,
            3 => LogLevel::Error,
            _ => LogLevel::Critical,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ControlError::invalid_argument(format!(
                "Unknown log level: {}",
                s
            ))),
        }
    }
}

/// User-supplied sink. Invoked synchronously on the logging thread.
pub type LogCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

lazy_static::lazy_static! {
    static ref CALLBACK: RwLock<Option<LogCallback>> = RwLock::new(None);
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::DEFAULT as u8);

/// Install (or with `None`, remove) the process-wide callback.
pub fn set_log_callback(callback: Option<LogCallback>) {
    let mut slot = CALLBACK.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = callback;
}

/// Convenience wrapper around [`set_log_callback`] for closures.
pub fn set_log_callback_fn<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    set_log_callback(Some(Arc::new(callback)));
}

pub fn clear_log_callback() {
    set_log_callback(None);
}

pub fn has_log_callback() -> bool {
    CALLBACK
        .read()
        .map(|slot| slot.is_some())
        .unwrap_or_else(|poisoned| poisoned.into_inner().is_some())
}

pub fn set_log_level(level: LogLevel) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_log_level() -> LogLevel {
    LogLevel::from_u8(MIN_LEVEL.load(Ordering::Relaxed))
}

/// Whether a message at `level` would currently reach a callback.
pub fn would_emit(level: LogLevel) -> bool {
    level >= get_log_level() && has_log_callback()
}

/// Deliver `message` to the callback if one is set and `level` passes the filter.
pub fn log_message(level: LogLevel, message: &str) {
    if level < get_log_level() {
        return;
    }

    let callback = {
        let slot = CALLBACK.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_ref() {
            Some(cb) => Arc::clone(cb),
            None => return,
        }
    };

    callback(level, message);
}

pub fn log_debug(message: &str) {
    log_message(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_message(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_message(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_message(LogLevel::Error, message);
}

pub fn log_critical(message: &str) {
    log_message(LogLevel::Critical, message);
}

/// Clear the callback and restore the default minimum level.
pub fn reset() {
    clear_log_callback();
    set_log_level(LogLevel::DEFAULT);
}

/// Owner of the process-wide logging state for its lifetime.
#[must_use = "dropping the session immediately resets logging"]
pub struct LoggingSession {
    _private: (),
}

impl LoggingSession {
    pub fn set_level(&self, level: LogLevel) {
        set_log_level(level);
    }

    pub fn set_callback(&self, callback: LogCallback) {
        set_log_callback(Some(callback));
    }
}

impl Drop for LoggingSession {
    fn drop(&mut self) {
        reset();
    }
}

/// Install `callback` with minimum `level` and return the owning session.
pub fn init(callback: LogCallback, level: LogLevel) -> LoggingSession {
    set_log_level(level);
    set_log_callback(Some(callback));
    LoggingSession { _private: () }
}

/// Sink writing `[timestamp] [LEVEL] message` lines; errors and above go to
/// stderr, everything else to stdout.
pub fn stderr_sink() -> LogCallback {
    Arc::new(|level: LogLevel, message: &str| {
        let line = format_line(level, message);
        if level >= LogLevel::Error {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        } else {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    })
}

fn format_line(level: LogLevel, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        message
    )
}

/// Emit a library event to both the `log` facade and the callback sink.
macro_rules! emit {
    ($level:expr, $($arg:tt)+) => {{
        let level: $crate::logging::LogLevel = $level;
        log::log!(level.as_log_level(), $($arg)+);
        if $crate::logging::would_emit(level) {
            $crate::logging::log_message(level, &format!($($arg)+));
        }
    }};
}

pub(crate) use emit;
