use std::path::PathBuf;

/// Configuration error (spec §7.1): missing section/key or unknown
/// verbosity. Fatal at startup — never recovered from mid-run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("missing required key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("unknown verbosity '{0}', expected one of: critical, error, warn, info, debug, trace")]
    UnknownVerbosity(String),
}
