use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fuzzer_container::{ContainerError, ContainerHost, ExecHandle};
use fuzzer_core::{Executor, ExitReason, GethLauncher, ParityLauncher, TestCase, TestId};
use fuzzer_store::FilesystemStore;
use fuzzer_trace::{CanonicalizerRegistry, JsonLineCanonicalizer};
use tokio::process::Command;
use tokio::sync::mpsc;

/// A `ContainerHost` that never touches Docker: `exec` parses the
/// `/logs/<file>` destination out of the shell-wrapped argv and writes
/// scripted per-client trace content there directly, then completes via
/// a trivial real child process so `ExecHandle::wait` has something to
/// await.
struct ScriptedHost {
    logs_dir: PathBuf,
    traces: Mutex<std::collections::HashMap<String, Vec<String>>>,
    failing_clients: Vec<String>,
}

impl ScriptedHost {
    fn new(logs_dir: PathBuf, traces: std::collections::HashMap<String, Vec<String>>) -> Self {
        Self {
            logs_dir,
            traces: Mutex::new(traces),
            failing_clients: Vec::new(),
        }
    }

    fn with_failing_client(mut self, client: &str) -> Self {
        self.failing_clients.push(client.to_string());
        self
    }
}

#[async_trait]
impl ContainerHost for ScriptedHost {
    async fn start_daemon(&self, _name: &str, _image: &str) -> Result<(), ContainerError> {
        Ok(())
    }

    async fn exec(&self, name: &str, argv: &[String]) -> Result<ExecHandle, ContainerError> {
        if self.failing_clients.iter().any(|c| c == name) {
            return Err(ContainerError::Spawn(
                name.to_string(),
                std::io::Error::other("scripted exec failure"),
            ));
        }

        let script = argv.last().cloned().unwrap_or_default();
        let trace_filename = script
            .rsplit("/logs/")
            .next()
            .expect("wrapped command redirects into /logs/<file>")
            .to_string();

        let lines = self
            .traces
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default();
        std::fs::write(self.logs_dir.join(trace_filename), lines.join("\n")).unwrap();

        let child = Command::new("sh")
            .arg("-c")
            .arg("exit 0")
            .spawn()
            .expect("spawn stub child");
        Ok(ExecHandle::from_child(format!("fake exec {name}"), child))
    }

    async fn kill(&self, _name: &str) -> Result<(), ContainerError> {
        Ok(())
    }

    async fn remove_image(&self, _image: &str) -> Result<(), ContainerError> {
        Ok(())
    }
}

fn store() -> (FilesystemStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let testfiles = dir.path().join("testfiles");
    let logs = dir.path().join("logs");
    let artefacts = dir.path().join("artefacts");
    std::fs::create_dir_all(&testfiles).unwrap();
    std::fs::create_dir_all(&logs).unwrap();
    std::fs::create_dir_all(&artefacts).unwrap();
    (FilesystemStore::new(testfiles, logs, artefacts), dir)
}

fn registry() -> Arc<CanonicalizerRegistry> {
    let mut registry = CanonicalizerRegistry::empty();
    registry.register("geth", JsonLineCanonicalizer::new(JsonLineCanonicalizer::GETH));
    registry.register("parity", JsonLineCanonicalizer::new(JsonLineCanonicalizer::PARITY));
    Arc::new(registry)
}

fn launchers() -> Vec<Box<dyn fuzzer_core::ClientLauncher>> {
    vec![
        Box::new(GethLauncher { name: "geth".to_string() }),
        Box::new(ParityLauncher { name: "parity".to_string() }),
    ]
}

/// Scenario 1 (spec §8): two clients produce identical canonical traces
/// -> PASS, test JSON and both trace files deleted.
#[tokio::test]
async fn matching_traces_pass_and_discard_artifacts() {
    let (store, _dir) = store();
    let test_json = store.write("u-Mon_10_00_00-123-0.json", &serde_json::json!({})).unwrap();

    let mut traces = std::collections::HashMap::new();
    let agreed = vec![
        r#"{"pc":0,"op":"PUSH1","depth":1}"#.to_string(),
        r#"{"pc":2,"op":"PUSH1","depth":1}"#.to_string(),
        r#"{"pc":4,"op":"STOP","depth":1}"#.to_string(),
    ];
    traces.insert("geth".to_string(), agreed.clone());
    traces.insert("parity".to_string(), agreed);

    let host: Arc<dyn ContainerHost> = Arc::new(ScriptedHost::new(store.logfiles_dir().to_path_buf(), traces));
    let mut executor = Executor::new(host, store.clone(), registry(), launchers(), false, false);

    let mut case = TestCase::new(TestId::new("u-Mon_10_00_00-123", 0), serde_json::json!({}));
    case.filename = "u-Mon_10_00_00-123-0.json".to_string();
    let (tx, rx) = mpsc::channel(1);
    tx.send(case).await.unwrap();
    drop(tx);

    let reason = executor.run(rx).await.unwrap();
    assert_eq!(reason, ExitReason::GeneratorDrained);
    assert_eq!(executor.stats().total(), 1);
    assert!(!test_json.exists(), "passed test's JSON should be discarded");
}

/// Scenario 2 (spec §8): `parity` diverges at step index 1 -> FAIL;
/// artefacts/ gets the test JSON, both raw traces, and the combined /
/// shortened ancillary logs.
#[tokio::test]
async fn diverging_traces_fail_and_archive_artifacts() {
    let (store, _dir) = store();
    store.write("u-Mon_10_00_00-123-1.json", &serde_json::json!({})).unwrap();

    let mut traces = std::collections::HashMap::new();
    traces.insert(
        "geth".to_string(),
        vec![
            r#"{"pc":0,"op":"PUSH1","depth":1}"#.to_string(),
            r#"{"pc":2,"op":"PUSH1","depth":1}"#.to_string(),
            r#"{"pc":4,"op":"STOP","depth":1}"#.to_string(),
        ],
    );
    traces.insert(
        "parity".to_string(),
        vec![
            r#"{"pc":0,"op":"PUSH1","depth":1}"#.to_string(),
            r#"{"pc":2,"op":"JUMP","depth":1}"#.to_string(),
            r#"{"pc":4,"op":"STOP","depth":1}"#.to_string(),
        ],
    );

    let host: Arc<dyn ContainerHost> = Arc::new(ScriptedHost::new(store.logfiles_dir().to_path_buf(), traces));
    let mut executor = Executor::new(host, store.clone(), registry(), launchers(), false, false);

    let mut case = TestCase::new(TestId::new("u-Mon_10_00_00-123", 1), serde_json::json!({}));
    case.filename = "u-Mon_10_00_00-123-1.json".to_string();
    let (tx, rx) = mpsc::channel(1);
    tx.send(case).await.unwrap();
    drop(tx);

    let reason = executor.run(rx).await.unwrap();
    assert_eq!(reason, ExitReason::GeneratorDrained);

    let artefact = store.artefacts_dir().join("u-Mon_10_00_00-123-1.json");
    assert!(artefact.exists(), "failed test's JSON should be archived");
    assert!(store.artefacts_dir().join("u-Mon_10_00_00-123-1-combined_trace.log").exists());
    assert!(store.artefacts_dir().join("u-Mon_10_00_00-123-1-shortened_trace.log").exists());
}

/// Spec §8 scenario 3: `force_save=true` with equal traces still counts
/// as PASS, but the test and its traces land in `artefacts/` instead of
/// being discarded.
#[tokio::test]
async fn force_save_archives_a_passing_test_but_still_counts_it_as_pass() {
    let (store, _dir) = store();
    store.write("u-Mon_10_00_00-123-2.json", &serde_json::json!({})).unwrap();

    let mut traces = std::collections::HashMap::new();
    let agreed = vec![r#"{"pc":0,"op":"STOP","depth":1}"#.to_string()];
    traces.insert("geth".to_string(), agreed.clone());
    traces.insert("parity".to_string(), agreed);

    let host: Arc<dyn ContainerHost> = Arc::new(ScriptedHost::new(store.logfiles_dir().to_path_buf(), traces));
    let mut executor = Executor::new(host, store.clone(), registry(), launchers(), true, false);

    let mut case = TestCase::new(TestId::new("u-Mon_10_00_00-123", 2), serde_json::json!({}));
    case.filename = "u-Mon_10_00_00-123-2.json".to_string();
    let (tx, rx) = mpsc::channel(1);
    tx.send(case).await.unwrap();
    drop(tx);

    let reason = executor.run(rx).await.unwrap();
    assert_eq!(reason, ExitReason::GeneratorDrained);
    assert_eq!(executor.stats().passed(), 1);
    assert_eq!(executor.stats().failed(), 0);
    assert!(
        store.artefacts_dir().join("u-Mon_10_00_00-123-2.json").exists(),
        "force_save should archive a passing test's JSON rather than discard it"
    );
}

/// Spec §8 boundary: a zero-client configuration must not deadlock the
/// scheduler, and the trivially-empty comparison counts as a pass.
#[tokio::test]
async fn zero_client_configuration_passes_trivially_without_deadlocking() {
    let (store, _dir) = store();
    let host: Arc<dyn ContainerHost> = Arc::new(ScriptedHost::new(store.logfiles_dir().to_path_buf(), Default::default()));
    let mut executor = Executor::new(host, store.clone(), registry(), Vec::new(), false, false);

    let case = TestCase::new(TestId::new("u-Mon_10_00_00-123", 3), serde_json::json!({}));
    let (tx, rx) = mpsc::channel(1);
    tx.send(case).await.unwrap();
    drop(tx);

    let reason = tokio::time::timeout(std::time::Duration::from_secs(5), executor.run(rx))
        .await
        .expect("scheduler deadlocked on a zero-client configuration")
        .unwrap();
    assert_eq!(reason, ExitReason::GeneratorDrained);
    assert_eq!(executor.stats().passed(), 1);
}

/// Spec §7 items 2 and 6: one launcher's exec failure fails only that
/// (test, client) pair, not the whole scheduler loop.
#[tokio::test]
async fn exec_failure_for_one_client_fails_only_that_test_and_loop_continues() {
    let (store, _dir) = store();
    store.write("u-Mon_10_00_00-123-4.json", &serde_json::json!({})).unwrap();

    let mut traces = std::collections::HashMap::new();
    traces.insert("geth".to_string(), vec![r#"{"pc":0,"op":"STOP","depth":1}"#.to_string()]);

    let host: Arc<dyn ContainerHost> = Arc::new(
        ScriptedHost::new(store.logfiles_dir().to_path_buf(), traces).with_failing_client("parity"),
    );
    let mut executor = Executor::new(host, store.clone(), registry(), launchers(), false, false);

    let mut case = TestCase::new(TestId::new("u-Mon_10_00_00-123", 4), serde_json::json!({}));
    case.filename = "u-Mon_10_00_00-123-4.json".to_string();
    let (tx, rx) = mpsc::channel(1);
    tx.send(case).await.unwrap();
    drop(tx);

    let reason = tokio::time::timeout(std::time::Duration::from_secs(5), executor.run(rx))
        .await
        .expect("a single exec failure should not hang the scheduler")
        .unwrap();
    assert_eq!(reason, ExitReason::GeneratorDrained);
    assert_eq!(executor.stats().failed(), 1, "parity's exec failure should fail the test, not the process");
    assert!(store.artefacts_dir().join("u-Mon_10_00_00-123-4.json").exists());
}
