// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Read a preference from the environment, falling back when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerPreferences {
    /// Whether to log every emitted token at debug level
    pub log_token_details: bool,

    /// Whether to collect quoted-token and length metrics
    pub collect_metrics: bool,

    /// Whether to include the offending position in error messages
    pub include_position_in_errors: bool,
}

impl Default for TokenizerPreferences {
    fn default() -> Self {
        Self {
            log_token_details: env_or(env_vars::TOKENIZER_LOG_TOKEN_DETAILS, false),
            collect_metrics: env_or(env_vars::TOKENIZER_COLLECT_METRICS, true),
            include_position_in_errors: env_or(env_vars::TOKENIZER_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecPreferences {
    /// Line length used when the caller does not pick one (0 disables wrapping)
    pub default_line_length: u32,

    /// Whether to log a summary after each streamed encode
    pub log_encode_summary: bool,
}

impl Default for CodecPreferences {
    fn default() -> Self {
        Self {
            default_line_length: env_or(
                env_vars::CODEC_DEFAULT_LINE_LENGTH,
                crate::config::compile_time::codec::DEFAULT_LINE_LENGTH,
            ),
            log_encode_summary: env_or(env_vars::CODEC_LOG_ENCODE_SUMMARY, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionPreferences {
    /// Whether to log each node visited during a search
    pub log_search_steps: bool,

    /// Whether to log NotFound outcomes (they are expected, so off by default)
    pub log_not_found: bool,
}

impl Default for ResolutionPreferences {
    fn default() -> Self {
        Self {
            log_search_steps: env_or(env_vars::RESOLUTION_LOG_SEARCH_STEPS, false),
            log_not_found: env_or(env_vars::RESOLUTION_LOG_NOT_FOUND, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level (within security constraints)
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub tokenizer: TokenizerPreferences,
    pub codec: CodecPreferences,
    pub resolution: ResolutionPreferences,
    pub logging: LoggingPreferences,
}

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Preferences read from the environment on first use, then shared.
/// The `Default` impls always read the environment again.
pub fn runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::default)
}

/// Environment variable names for configuration
pub mod env_vars {
    // Tokenizer
    pub const TOKENIZER_LOG_TOKEN_DETAILS: &str = "BUNDLE_UTIL_TOKENIZER_LOG_TOKEN_DETAILS";
    pub const TOKENIZER_COLLECT_METRICS: &str = "BUNDLE_UTIL_TOKENIZER_COLLECT_METRICS";
    pub const TOKENIZER_INCLUDE_POSITIONS: &str = "BUNDLE_UTIL_TOKENIZER_INCLUDE_POSITIONS";

    // Codec
    pub const CODEC_DEFAULT_LINE_LENGTH: &str = "BUNDLE_UTIL_CODEC_DEFAULT_LINE_LENGTH";
    pub const CODEC_LOG_ENCODE_SUMMARY: &str = "BUNDLE_UTIL_CODEC_LOG_ENCODE_SUMMARY";

    // Resolution
    pub const RESOLUTION_LOG_SEARCH_STEPS: &str = "BUNDLE_UTIL_RESOLUTION_LOG_SEARCH_STEPS";
    pub const RESOLUTION_LOG_NOT_FOUND: &str = "BUNDLE_UTIL_RESOLUTION_LOG_NOT_FOUND";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "BUNDLE_UTIL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "BUNDLE_UTIL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "BUNDLE_UTIL_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("BUNDLE_UTIL_TEST_ENV_OR_GARBAGE", "not-a-number");
        assert_eq!(env_or("BUNDLE_UTIL_TEST_ENV_OR_GARBAGE", 64u32), 64);

        std::env::set_var("BUNDLE_UTIL_TEST_ENV_OR_VALID", " 8 ");
        assert_eq!(env_or("BUNDLE_UTIL_TEST_ENV_OR_VALID", 64u32), 8);

        assert!(env_or("BUNDLE_UTIL_TEST_ENV_OR_UNSET", true));
    }

    #[test]
    fn test_runtime_config_is_read_once() {
        let first = runtime_config();
        let second = runtime_config();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_runtime_config_serializes() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("default_line_length"));
        assert!(json.contains("log_search_steps"));
    }
}
