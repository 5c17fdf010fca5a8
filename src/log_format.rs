// LogFormat - unified formatting for method-call / error log lines.
//
// Every public operation logs its call site at debug level and its
// failures at error level, gated entirely behind the `logging` feature
// so release builds without `log` pay nothing.

/// Formatting utilities for call-site and error log lines.
pub struct LogFormat;

impl LogFormat {
    /// Renders a method-call log line.
    ///
    /// # Examples
    ///
    /// ```
    /// use dntrie::log_format::LogFormat;
    ///
    /// let line = LogFormat::method_call("QpBackend", "set", &["'a.com'".to_string()]);
    /// assert_eq!(line, "QpBackend::set('a.com')");
    /// ```
    pub fn method_call(class: &str, method: &str, args: &[String]) -> String {
        let args_str = args.join(", ");
        format!("{class}::{method}({args_str})")
    }

    /// Renders an error log line.
    ///
    /// # Examples
    ///
    /// ```
    /// use dntrie::log_format::LogFormat;
    ///
    /// let line = LogFormat::error("MmapBackend", "swap", "temp file write failed");
    /// assert_eq!(line, "MmapBackend::swap: temp file write failed");
    /// ```
    pub fn error(class: &str, method: &str, message: &str) -> String {
        format!("{class}::{method}: {message}")
    }

    /// Formats a string argument for a call-site log line, truncating long values.
    pub fn format_str_arg(s: &str) -> String {
        if s.len() > 50 {
            format!("'{}'...", &s[..47])
        } else {
            format!("'{s}'")
        }
    }
}

/// Logs a method-call line: `Class::method('arg1', 'arg2')`.
#[macro_export]
macro_rules! log_method {
    ($class:expr, $method:expr $(, $arg:expr)*) => {{
        #[cfg(feature = "logging")]
        {
            let args: Vec<String> = vec![
                $(
                    $crate::log_format::LogFormat::format_str_arg($arg),
                )*
            ];
            log::debug!("{}", $crate::log_format::LogFormat::method_call($class, $method, &args));
        }
    }};
}

/// Logs an error line: `Class::method: message`.
#[macro_export]
macro_rules! log_err {
    ($class:expr, $method:expr, $msg:expr) => {{
        #[cfg(feature = "logging")]
        {
            log::error!("{}", $crate::log_format::LogFormat::error($class, $method, $msg));
        }
    }};
}

/// Evaluates `$result`, calling [`log_err!`] on its message (via `Display`)
/// if it is an `Err`, then passes the result through unchanged.
#[macro_export]
macro_rules! log_result {
    ($class:expr, $method:expr, $result:expr) => {{
        let result = $result;
        #[cfg(feature = "logging")]
        if let Err(ref e) = result {
            $crate::log_err!($class, $method, &e.to_string());
        }
        result
    }};
}
