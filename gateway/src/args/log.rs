use std::fmt;

use clap::ValueEnum;

/// Crates whose events are kept below the debug level.
const GATEWAY_TARGETS: [&str; 6] = [
    "cosmos_graphql_gateway",
    "gateway_server",
    "gateway_config",
    "engine",
    "runtime",
    "runtime_local",
];

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Completely disables logging
    Off,
    /// Only errors from the gateway
    Error,
    /// Warnings and errors from the gateway
    Warn,
    /// Info, warning and error messages from the gateway
    #[default]
    Info,
    /// Debug, info, warning and error messages from all dependencies
    Debug,
    /// Trace, debug, info, warning and error messages from all dependencies
    Trace,
}

impl LogLevel {
    pub(crate) fn as_filter_str(&self) -> String {
        match self {
            LogLevel::Off => "off".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
            LogLevel::Error | LogLevel::Warn | LogLevel::Info => {
                let mut directives = GATEWAY_TARGETS
                    .iter()
                    .map(|target| format!("{target}={self}"))
                    .collect::<Vec<_>>();

                directives.push("off".to_string());
                directives.join(",")
            }
        }
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Standard text
    Text,
    /// JSON objects
    Json,
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
