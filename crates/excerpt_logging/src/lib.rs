#![deny(missing_docs)]
//! Shared logging utilities for the excerpt workspace.
//!
//! This crate provides the `excerpt_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

/// Log target used by every macro in this crate, so hosts can filter excerpt output.
pub const LOG_TARGET: &str = "excerpts";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! excerpt_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! excerpt_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! excerpt_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! excerpt_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! excerpt_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Routes excerpt log records to the terminal while tests run.
///
/// Only records under [`LOG_TARGET`] pass, so scraper and parser noise stays out
/// of test output. Calling it again after a logger is installed does nothing.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        excerpt_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn excerpt_config() -> simplelog::Config {
    simplelog::ConfigBuilder::new()
        .add_filter_allow_str(LOG_TARGET)
        .set_target_level(log::LevelFilter::Off)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_keeps_excerpt_target_enabled() {
        initialize_for_tests();
        initialize_for_tests();

        assert!(log::log_enabled!(target: LOG_TARGET, log::Level::Info));
        excerpt_info!("logger ready");
    }
}
