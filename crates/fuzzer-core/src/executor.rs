use std::collections::HashMap;
use std::sync::Arc;

use fuzzer_container::ContainerHost;
use fuzzer_store::FilesystemStore;
use fuzzer_trace::{compare, summary, CanonicalizerRegistry};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{Error, TestError, TestErrorKind};
use crate::launcher::{sh_wrap, ClientLauncher};
use crate::model::{RunningTest, TestCase, TestId, TestState};
use crate::stats::ExecutorStats;

/// Upper safety cap on concurrently in-flight tests (spec §4.F); steady
/// state is typically far below it.
pub const MAX_PARALLEL: usize = 50;

/// Why the scheduler loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    GeneratorDrained,
    Interrupted,
}

struct Completion {
    test_id: TestId,
    client: String,
    event_mask: String,
}

/// The single scheduler loop (spec §4.F). Dispatches each generated test
/// to every configured client, multiplexes over however many runner
/// completions are outstanding, and post-processes a test as soon as
/// every one of its runners has signalled completion.
pub struct Executor {
    container: Arc<dyn ContainerHost>,
    store: FilesystemStore,
    canonicalizers: Arc<CanonicalizerRegistry>,
    launchers: Vec<Box<dyn ClientLauncher>>,
    force_save: bool,
    enable_reporting: bool,
    active: HashMap<TestId, RunningTest>,
    completion_tx: mpsc::Sender<Completion>,
    completion_rx: mpsc::Receiver<Completion>,
    stats: ExecutorStats,
}

impl Executor {
    pub fn new(
        container: Arc<dyn ContainerHost>,
        store: FilesystemStore,
        canonicalizers: Arc<CanonicalizerRegistry>,
        launchers: Vec<Box<dyn ClientLauncher>>,
        force_save: bool,
        enable_reporting: bool,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel(MAX_PARALLEL * 4);
        Self {
            container,
            store,
            canonicalizers,
            launchers,
            force_save,
            enable_reporting,
            active: HashMap::new(),
            completion_tx,
            completion_rx,
            stats: ExecutorStats::new(),
        }
    }

    pub fn stats(&self) -> &ExecutorStats {
        &self.stats
    }

    /// Drives the loop until the generator channel closes (normal
    /// shutdown) or SIGINT fires (spec §4.F cancellation).
    pub async fn run(&mut self, mut generator_rx: mpsc::Receiver<TestCase>) -> Result<ExitReason, Error> {
        loop {
            let have_capacity = self.active.len() < MAX_PARALLEL;

            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c() => {
                    warn!("SIGINT received, tearing down");
                    return Ok(ExitReason::Interrupted);
                }

                Some(completion) = self.completion_rx.recv() => {
                    self.handle_completion(completion).await?;
                }

                maybe_case = generator_rx.recv(), if have_capacity => {
                    match maybe_case {
                        Some(case) => self.dispatch(case).await?,
                        None if self.active.is_empty() => return Ok(ExitReason::GeneratorDrained),
                        None => {
                            // Generator is done but tests are still in
                            // flight; keep draining completions only.
                            if let Some(completion) = self.completion_rx.recv().await {
                                self.handle_completion(completion).await?;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Spec §4.F step 3: start a runner per active client, register its
    /// completion future, bump `numprocs`. A single launcher's exec
    /// failure (spec §7 item 2) fails only that (test, client) pair,
    /// reported through the same completion channel as a normal runner
    /// exit rather than propagated out of dispatch.
    async fn dispatch(&mut self, case: TestCase) -> Result<(), Error> {
        let mut running = RunningTest::new(case);

        for launcher in &self.launchers {
            let client = launcher.client_name().to_string();
            let argv = launcher.build_argv(&running.case);
            let trace_filename = self.store.trace_filename(running.case.id.as_str(), &client);
            let wrapped = sh_wrap(&argv, &trace_filename);

            running.case.trace_files.push(self.store.trace_path(running.case.id.as_str(), &client));
            running.register_start(&client);

            match self.container.exec(&client, &wrapped).await {
                Ok(handle) => {
                    let tx = self.completion_tx.clone();
                    let test_id = running.case.id.clone();
                    let client_for_task = client.clone();
                    tokio::spawn(async move {
                        let event_mask = match handle.wait().await {
                            Ok(status) if status.success() => "[17]".to_string(),
                            Ok(_) => "[21]".to_string(),
                            Err(e) => {
                                warn!(error = %e, "exec wait failed");
                                "[33]".to_string()
                            }
                        };
                        let _ = tx
                            .send(Completion {
                                test_id,
                                client: client_for_task,
                                event_mask,
                            })
                            .await;
                    });
                }
                Err(e) => {
                    let test_error = TestError {
                        test_id: running.case.id.to_string(),
                        client: client.clone(),
                        kind: TestErrorKind::Exec(e),
                    };
                    warn!(error = %test_error, "runner failed to start, marking this client failed");
                    let _ = self
                        .completion_tx
                        .send(Completion {
                            test_id: running.case.id.clone(),
                            client,
                            event_mask: "[33]".to_string(),
                        })
                        .await;
                }
            }
        }

        running.mark_awaiting();

        // Zero configured clients (or every launcher failed to start
        // synchronously before any completion could fire): nothing left
        // to wait on, so post-process immediately instead of parking
        // this test in `active` forever (spec §8 boundary: zero-client
        // configuration must not deadlock the scheduler).
        if running.numprocs == 0 {
            running.state = TestState::Complete;
            self.post_process(running)?;
        } else {
            self.active.insert(running.case.id.clone(), running);
        }
        Ok(())
    }

    /// Spec §4.F steps 5-6: attribute a fired completion to its test;
    /// once every runner for that test has reported, hand it to the
    /// post-processor and free its `active_tests` slot.
    async fn handle_completion(&mut self, completion: Completion) -> Result<(), Error> {
        let done = match self.active.get_mut(&completion.test_id) {
            Some(running) => running.record_completion(&completion.event_mask),
            None => return Ok(()),
        };

        if done {
            if let Some(running) = self.active.remove(&completion.test_id) {
                self.post_process(running)?;
            }
        }
        Ok(())
    }

    /// Spec §4.G: canonicalize each client's trace, compare, archive or
    /// discard, update statistics.
    fn post_process(&mut self, mut running: RunningTest) -> Result<(), Error> {
        let client_order = running.client_names.clone();
        let mut combined_step_stats = fuzzer_trace::TraceStepStats::default();

        for (client, trace_path) in client_order.iter().zip(running.case.trace_files.iter()) {
            let (steps, step_stats, found) = self.canonicalizers.canonicalize_file(client, trace_path);
            if !found {
                warn!(
                    test_id = %running.case.id,
                    client = %client,
                    event_log = %running.socket_event_log,
                    "expected trace file missing at post-processing"
                );
            }
            combined_step_stats.len = combined_step_stats.len.max(step_stats.len);
            combined_step_stats.max_depth = combined_step_stats.max_depth.max(step_stats.max_depth);
            combined_step_stats.constantinople_ops += step_stats.constantinople_ops;
            running.case.traces.insert(client.clone(), steps);
        }

        let result = compare(&running.case.traces, &client_order);

        if result.equivalent {
            running.state = TestState::Passed;
            self.stats.record_pass(combined_step_stats);

            // The test JSON was already written to testfiles/ by the
            // generator pipeline. A pass is only archived instead of
            // discarded when force_save asks to keep every artifact
            // around (spec §8 scenario 3), still counted as PASS.
            if self.force_save {
                self.store.archive(&running.case.filename, &running.case.trace_files)?;
            } else {
                self.store.discard(&running.case.filename, &running.case.trace_files)?;
            }
        } else {
            running.state = TestState::Failed;
            self.stats.record_fail(combined_step_stats);
            warn!(test_id = %running.case.id, "CONSENSUS BUG");

            self.store.archive(&running.case.filename, &running.case.trace_files)?;

            let combined_text = result.combined.join("\n");
            self.store
                .add_artifact(running.case.id.as_str(), "combined_trace.log", &combined_text)?;

            let shortened = summary(&result.combined, 20, 5).join("\n");
            self.store
                .add_artifact(running.case.id.as_str(), "shortened_trace.log", &shortened)?;
        }

        if self.enable_reporting {
            info!(test_id = %running.case.id, "{}", self.stats.summary_line());
        }
        Ok(())
    }

    /// Kills every client daemon (spec §4.F cancellation / §8 scenario 6).
    pub async fn shutdown(&self, client_names: &[String]) {
        for name in client_names {
            if let Err(e) = self.container.kill(name).await {
                warn!(client = %name, error = %e, "failed to kill daemon during shutdown");
            }
        }
    }
}
