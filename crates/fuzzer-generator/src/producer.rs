use fuzzer_core::{TestCase, TestId};
use fuzzer_store::FilesystemStore;
use tokio::sync::mpsc;
use tracing::warn;

use crate::factory::TestFactory;
use crate::rekey::rekey_payload;

/// Runs the Test Generator Pipeline producer (spec §4.E): each cycle,
/// fetch from the factory, re-key, assign the next counter, write the
/// file, and push onto `sender` — which blocks once the channel (bounded
/// to capacity 20 by the caller) is full, the pipeline's only
/// back-pressure mechanism.
pub async fn run_producer(
    mut factory: Box<dyn TestFactory>,
    store: FilesystemStore,
    host_tag: String,
    fork: Option<String>,
    sender: mpsc::Sender<TestCase>,
) {
    let mut counter: u64 = 0;

    loop {
        let payload = factory.fill().await;
        let id = TestId::new(&host_tag, counter);
        counter += 1;

        let rekeyed = rekey_payload(payload, &id, fork.as_deref());
        let case = TestCase::new(id, rekeyed);

        if let Err(e) = store.write(&case.filename, &case.payload) {
            warn!(test_id = %case.id, error = %e, "failed to write generated test file, dropping");
            continue;
        }

        if sender.send(case).await.is_err() {
            // Scheduler side has shut down; nothing left to produce for.
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::SyntheticTestFactory;
    use std::fs;

    fn store() -> (FilesystemStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let testfiles = dir.path().join("testfiles");
        let logs = dir.path().join("logs");
        let artefacts = dir.path().join("artefacts");
        fs::create_dir_all(&testfiles).unwrap();
        fs::create_dir_all(&logs).unwrap();
        fs::create_dir_all(&artefacts).unwrap();
        (FilesystemStore::new(testfiles, logs, artefacts), dir)
    }

    #[tokio::test]
    async fn producer_assigns_monotonically_increasing_counters() {
        let (store, _dir) = store();
        let (tx, mut rx) = mpsc::channel(2);

        let handle = tokio::spawn(run_producer(
            Box::new(SyntheticTestFactory::default()),
            store,
            "u-Mon_10_00_00-1".to_string(),
            None,
            tx,
        ));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.id.as_str(), "u-Mon_10_00_00-1-0");
        assert_eq!(second.id.as_str(), "u-Mon_10_00_00-1-1");

        drop(rx);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn producer_stops_once_receiver_is_dropped() {
        let (store, _dir) = store();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        run_producer(
            Box::new(SyntheticTestFactory::default()),
            store,
            "u-Mon_10_00_00-1".to_string(),
            None,
            tx,
        )
        .await;
        // Reaching here without hanging demonstrates the producer exits
        // cleanly once `send` fails.
    }
}
