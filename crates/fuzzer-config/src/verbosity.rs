use crate::error::ConfigError;

/// Log verbosity level, parsed from `-v/--verbosity` (spec §6). Unknown
/// values are a fatal configuration error at startup (spec §7.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Critical,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "critical" | "fatal" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" | "notset" => Ok(Self::Trace),
            other => Err(ConfigError::UnknownVerbosity(other.to_string())),
        }
    }

    /// The `tracing_subscriber::filter::LevelFilter`-compatible name.
    pub fn as_tracing_level(self) -> &'static str {
        match self {
            Self::Critical | Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}
