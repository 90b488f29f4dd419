#![deny(missing_docs)]
//! Shared logging utilities for the SearchPilot workspace.
//!
//! Every crate logs through the `pilot_*` macros below so that the backend
//! (the `log` facade) can be swapped in one place. The console binary installs
//! the real logger; tests call [`initialize_for_tests`].

use log::LevelFilter;

/// Environment variable that overrides the default log level.
pub const LOG_LEVEL_ENV: &str = "SEARCHPILOT_LOG_LEVEL";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! pilot_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! pilot_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! pilot_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! pilot_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! pilot_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Resolves the level filter from [`LOG_LEVEL_ENV`].
///
/// Unset or unparsable values fall back to `Debug` in debug builds and
/// `Info` in release builds.
pub fn level_from_env() -> LevelFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|raw| parse_level(&raw))
        .unwrap_or_else(default_level)
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.trim().parse::<LevelFilter>().ok()
}

fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level_from_env(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
