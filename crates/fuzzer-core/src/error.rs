/// Top-level error type, composed from every collaborator crate's own
/// error enum via `#[from]`, matching `bins/revme/src/cmd.rs`'s `Error`
/// enum shape.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Container(#[from] fuzzer_container::ContainerError),

    #[error(transparent)]
    Store(#[from] fuzzer_store::StoreError),

    #[error("generator channel closed before shutdown")]
    GeneratorClosed,
}

/// A single (test, client) runner failure (spec §7.6: "caught at the
/// iteration boundary", never propagated out of the scheduler loop).
#[derive(Debug, thiserror::Error)]
#[error("test {test_id} on client {client}: {kind}")]
pub struct TestError {
    pub test_id: String,
    pub client: String,
    pub kind: TestErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum TestErrorKind {
    #[error("container exec failed: {0}")]
    Exec(#[from] fuzzer_container::ContainerError),

    #[error("expected trace file missing at post-processing")]
    MissingTraceFile,
}
