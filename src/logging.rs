// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console logging for the decoder.
//!
//! A single process-wide [`LogLevel`] gates the [`warn!`](crate::warn) and
//! [`verbose!`](crate::verbose) macros. Warnings are on by default; per-frame
//! decode summaries are only printed once the level is raised to
//! [`LogLevel::Verbose`].

use std::sync::atomic::{AtomicU8, Ordering};

/// How much the decoder writes to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum LogLevel {
    /// Nothing at all.
    Silent = 0,
    /// Recoverable problems such as an inexact stride derivation.
    #[default]
    Warn = 1,
    /// Warnings plus candidate and suppression counts for every decode.
    Verbose = 2,
}

impl LogLevel {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Silent,
            1 => Self::Warn,
            _ => Self::Verbose,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);

/// Set the process-wide log level.
pub fn set_log_level(level: LogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

/// The current log level.
pub fn log_level() -> LogLevel {
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

/// Whether messages at `level` are currently printed.
pub fn enabled(level: LogLevel) -> bool {
    level != LogLevel::Silent && log_level() >= level
}

/// Shorthand for switching between [`LogLevel::Verbose`] and [`LogLevel::Warn`].
pub fn set_verbose(verbose: bool) {
    set_log_level(if verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Warn
    });
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::LogLevel::Warn) {
            use colored::Colorize;
            eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
        }
    }
}

/// Macro for per-decode diagnostics.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::LogLevel::Verbose) {
            use colored::Colorize;
            eprintln!("{} {}", "posenet".dimmed(), format!($($arg)*));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Silent < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Verbose);
        assert_eq!(LogLevel::default(), LogLevel::Warn);
        assert_eq!(LogLevel::from_u8(7), LogLevel::Verbose);
    }

    #[test]
    fn test_level_gates_messages() {
        set_log_level(LogLevel::Silent);
        assert!(!enabled(LogLevel::Warn));
        assert!(!enabled(LogLevel::Silent));

        set_verbose(true);
        assert_eq!(log_level(), LogLevel::Verbose);
        assert!(enabled(LogLevel::Warn));

        set_verbose(false);
        assert!(enabled(LogLevel::Warn));
        assert!(!enabled(LogLevel::Verbose));
    }
}
