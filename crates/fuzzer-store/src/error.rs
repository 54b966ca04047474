use std::path::PathBuf;

/// Filesystem errors from the artifact store (spec §4.B). Narrower than a
/// bare `io::Error` so callers can tell a write failure from a move
/// failure without string-matching.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write test file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize test payload: {0}")]
    Serialize(#[from] serde_json::Error),
}
