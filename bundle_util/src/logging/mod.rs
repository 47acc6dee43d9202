//! Global logging for the bundle utilities
//!
//! Thread-safe global service behind a `OnceLock`, code-classified events and
//! a small macro interface. Nothing is emitted until `init_global_logging`
//! (or `init_global_logging_with_service`) has been called.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    if let Some(code) = codes::REGISTERED.into_iter().find(|&code| codes::info(code).is_none()) {
        return Err(format!("Missing metadata for error code: {}", code));
    }

    let logging_service = Arc::new(LoggingService::with_config());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    logging_service.log_event(LogEvent::success(
        codes::success::LOGGING_INITIALIZED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a custom service (CLI and tests)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Used by the logging macros; `build` only runs when the event would be logged
pub fn dispatch(level: LogLevel, build: impl FnOnce() -> LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        if logger.should_log(level) {
            logger.log_event(build());
        }
    }
}

/// Diagnostics for `--verbose` output
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    if let Some(logger) = try_get_global_logger() {
        diagnostics.push_str(&format!(
            "Service level: {}\n",
            logger.min_level().as_str()
        ));
    }
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

#[cfg(test)]
static TEST_LOGGER: OnceLock<Arc<MemoryLogger>> = OnceLock::new();

/// Route the global logger into one shared memory logger at info level.
/// Tests in a binary run concurrently, so assertions look for their own
/// events by code and context rather than counting.
#[cfg(test)]
pub(crate) fn init_test_logging() -> &'static MemoryLogger {
    TEST_LOGGER.get_or_init(|| {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Info);
        let _ = init_global_logging_with_service(Arc::new(service));
        logger
    })
}
