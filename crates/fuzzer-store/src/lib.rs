//! Test Artifact Store (spec §4.B): owns the `testfiles/`, `logs/`, and
//! `artefacts/` directories a run writes into, and the archive/discard
//! transition every completed test goes through exactly once.

mod error;
mod store;

pub use error::StoreError;
pub use store::{ArchiveResult, FilesystemStore};
