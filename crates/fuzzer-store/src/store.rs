use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;

/// Result of archiving a test: the final location of the test JSON and of
/// every trace file that was moved alongside it.
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    pub test_json: PathBuf,
    pub trace_files: Vec<PathBuf>,
}

/// Test Artifact Store (spec §4.B): allocates deterministic paths under
/// `tests_path/{testfiles,logs}` and `artefacts/`, and moves or deletes
/// files as a test transitions to PASSED or FAILED. `archive` and
/// `discard` are mutually exclusive and each terminal for a given test —
/// enforced by the scheduler calling exactly one of them per test, never
/// both (spec §4.B invariant, §8).
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    testfiles_dir: PathBuf,
    logfiles_dir: PathBuf,
    artefacts_dir: PathBuf,
}

impl FilesystemStore {
    pub fn new(testfiles_dir: PathBuf, logfiles_dir: PathBuf, artefacts_dir: PathBuf) -> Self {
        Self {
            testfiles_dir,
            logfiles_dir,
            artefacts_dir,
        }
    }

    pub fn testfiles_dir(&self) -> &Path {
        &self.testfiles_dir
    }

    pub fn logfiles_dir(&self) -> &Path {
        &self.logfiles_dir
    }

    pub fn artefacts_dir(&self) -> &Path {
        &self.artefacts_dir
    }

    /// Persists `payload` as JSON at `testfilesPath/<filename>` (spec
    /// §4.B `write`).
    pub fn write(&self, filename: &str, payload: &serde_json::Value) -> Result<PathBuf, StoreError> {
        let path = self.testfiles_dir.join(filename);
        let contents = serde_json::to_vec(payload)?;
        fs::write(&path, contents).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "wrote test file");
        Ok(path)
    }

    /// Deterministic absolute path `logfilesPath/<id>-<client>.trace.log`
    /// (spec §4.B `trace_path`).
    pub fn trace_path(&self, id: &str, client: &str) -> PathBuf {
        self.logfiles_dir.join(format!("{id}-{client}.trace.log"))
    }

    /// Container-relative trace filename, i.e. the basename used in the
    /// `/bin/sh -c "... &> /logs/<tracefile>"` wrapper (spec §4.D).
    pub fn trace_filename(&self, id: &str, client: &str) -> String {
        format!("{id}-{client}.trace.log")
    }

    /// Moves the test JSON and every recorded trace file into `artefacts/`
    /// (spec §4.B `archive`). Idempotent: a source that no longer exists
    /// but whose destination already does is treated as already archived,
    /// not an error (spec §8 "archive is idempotent on already-archived
    /// paths").
    pub fn archive(&self, filename: &str, trace_files: &[PathBuf]) -> Result<ArchiveResult, StoreError> {
        let test_json = self.move_into_artefacts(&self.testfiles_dir.join(filename))?;

        let mut archived_traces = Vec::with_capacity(trace_files.len());
        for trace_file in trace_files {
            archived_traces.push(self.move_into_artefacts(trace_file)?);
        }

        info!(test_json = %test_json.display(), "archived test");
        Ok(ArchiveResult {
            test_json,
            trace_files: archived_traces,
        })
    }

    /// Deletes the test JSON and all its trace files (spec §4.B
    /// `discard`, used on PASS when `force_save=false`).
    pub fn discard(&self, filename: &str, trace_files: &[PathBuf]) -> Result<(), StoreError> {
        self.remove_best_effort(&self.testfiles_dir.join(filename))?;
        for trace_file in trace_files {
            self.remove_best_effort(trace_file)?;
        }
        Ok(())
    }

    /// Writes an ancillary file to `artefacts/<id>-<suffix>` (spec §4.B
    /// `add_artifact`), e.g. `combined_trace.log` / `shortened_trace.log`.
    pub fn add_artifact(&self, id: &str, suffix: &str, contents: &str) -> Result<PathBuf, StoreError> {
        let path = self.artefacts_dir.join(format!("{id}-{suffix}"));
        fs::write(&path, contents).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn move_into_artefacts(&self, source: &Path) -> Result<PathBuf, StoreError> {
        let Some(basename) = source.file_name() else {
            return Ok(source.to_path_buf());
        };
        let destination = self.artefacts_dir.join(basename);

        if !source.exists() && destination.exists() {
            // Already archived by a previous call; treat as a no-op.
            return Ok(destination);
        }

        fs::rename(source, &destination).map_err(|source_err| StoreError::Move {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: source_err,
        })?;
        Ok(destination)
    }

    fn remove_best_effort(&self, path: &Path) -> Result<(), StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
