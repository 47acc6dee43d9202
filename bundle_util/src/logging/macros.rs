//! Logging macros taking a `Code` plus `"key" => value` context pairs
//!
//! Context values only need `Display`. Events are built only when the global
//! logger is initialized and accepts the level.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {
        vec![$(($key, $value.to_string())),*]
    };
}

/// Log an error with a `Code`, an optional `position = ...` and context pairs
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, position = $position:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Error, || {
            $crate::logging::LogEvent::error($code, $message)
                .with_position($position)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Error, || {
            $crate::logging::LogEvent::error($code, $message)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };
}

/// Log success with a success `Code`
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Info, || {
            $crate::logging::LogEvent::success($code, $message)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Info, || {
            $crate::logging::LogEvent::info($message)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };
}

/// Log warning message, optionally tagged with `code = ...`
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Warning, || {
            $crate::logging::LogEvent::warning_with_code($code, $message)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };

    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Warning, || {
            $crate::logging::LogEvent::warning($message)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch($crate::logging::LogLevel::Debug, || {
            $crate::logging::LogEvent::debug($message)
                .with_pairs($crate::__log_context!($($key => $value),*))
        })
    };
}
