use std::collections::BTreeMap;
use std::path::PathBuf;

use fuzzer_trace::TraceStep;

/// Stable unique identifier, `<host-tag>-<counter>` (spec §3/§9).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestId(String);

impl TestId {
    pub fn new(host_tag: &str, counter: u64) -> Self {
        Self(format!("{host_tag}-{counter}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A synthesized test case (spec §3). Immutable after creation except
/// for its trace-collection fields, which the scheduler populates as
/// runners complete.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub id: TestId,
    pub filename: String,
    pub payload: serde_json::Value,
    pub traces: BTreeMap<String, Vec<TraceStep>>,
    pub trace_files: Vec<PathBuf>,
    pub artifacts: Vec<PathBuf>,
}

impl TestCase {
    pub fn new(id: TestId, payload: serde_json::Value) -> Self {
        let filename = format!("{id}-test.json");
        Self {
            id,
            filename,
            payload,
            traces: BTreeMap::new(),
            trace_files: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// The re-keyed top-level JSON key the generator wrote this test
    /// under (`randomStatetest<id>`, spec §4.E), also the `<testname>`
    /// argument some client argvs need (spec §4.D).
    pub fn root_key(&self) -> String {
        format!("randomStatetest{}", self.id)
    }
}

/// Lifecycle of a `TestCase` as it moves through the scheduler (spec §4,
/// "State machine"). Explicit enum replacing the dynamic
/// `numprocs`/`socketEvent`/`socketData` field-stashing the Python
/// original does on untyped test objects (spec §9 redesign item).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestState {
    New,
    Generated,
    Dispatched,
    Awaiting,
    Complete,
    Passed,
    Failed,
}

/// A `TestCase` currently in flight, tracking outstanding runners and
/// the diagnostic event/data logs the scheduler appends to as each
/// runner's completion channel fires (spec §4.F step 5).
#[derive(Debug)]
pub struct RunningTest {
    pub case: TestCase,
    pub client_names: Vec<String>,
    pub numprocs: usize,
    pub socket_event_log: String,
    pub socket_data_log: String,
    pub state: TestState,
}

impl RunningTest {
    pub fn new(case: TestCase) -> Self {
        Self {
            case,
            client_names: Vec::new(),
            numprocs: 0,
            socket_event_log: String::new(),
            socket_data_log: String::new(),
            state: TestState::Generated,
        }
    }

    /// Registers a started runner (spec §4.F step 3: increment
    /// `numprocs`, track the channel by client).
    pub fn register_start(&mut self, client: &str) {
        self.client_names.push(client.to_string());
        self.numprocs += 1;
        self.state = TestState::Dispatched;
    }

    pub fn mark_awaiting(&mut self) {
        if self.numprocs > 0 {
            self.state = TestState::Awaiting;
        }
    }

    /// A runner's completion channel fired (spec §4.F step 5): append
    /// the event bitmask and decrement the outstanding count. Returns
    /// `true` once every runner for this test has completed.
    pub fn record_completion(&mut self, event_mask: &str) -> bool {
        self.socket_event_log.push_str(event_mask);
        self.numprocs = self.numprocs.saturating_sub(1);
        if self.numprocs == 0 {
            self.state = TestState::Complete;
            true
        } else {
            false
        }
    }
}
