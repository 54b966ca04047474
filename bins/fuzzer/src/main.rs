mod error;
mod wiring;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use fuzzer_config::{CliArgs, Config, Verbosity};
use fuzzer_container::{ContainerHost, DockerHost};
use fuzzer_core::{Executor, ExitReason};
use fuzzer_generator::{run_producer, SyntheticTestFactory};
use fuzzer_store::FilesystemStore;
use fuzzer_trace::CanonicalizerRegistry;
use tracing::{info, warn};

use error::Error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    match run(cli).await {
        Ok(ExitReason::GeneratorDrained) => ExitCode::SUCCESS,
        Ok(ExitReason::Interrupted) => ExitCode::from(1),
        Err(e) => {
            eprintln!("fuzzer: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: CliArgs) -> Result<ExitReason, Error> {
    let verbosity = Verbosity::parse(&cli.verbosity)?;
    tracing_subscriber::fmt()
        .with_env_filter(verbosity.as_tracing_level())
        .init();

    let current_user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    let pid = std::process::id();
    let config = Config::load(&cli, &current_user, pid)?;
    config.ensure_directories()?;

    if config.benchmark {
        run_benchmark(&config).await;
        return Ok(ExitReason::GeneratorDrained);
    }

    if config.dry_run {
        warn!("--DRY RUN mode-- tests are generated but never executed");
        run_dry(&config).await;
        return Ok(ExitReason::GeneratorDrained);
    }

    let store = FilesystemStore::new(config.testfiles_path(), config.logfiles_path(), config.artefacts.clone());

    let host: Arc<dyn ContainerHost> = Arc::new(DockerHost::new(config.testfiles_path(), config.logfiles_path()));

    for image in &config.docker_force_update_image {
        if let Err(e) = host.remove_image(image).await {
            warn!(image, error = %e, "failed to force-remove image before start");
        }
    }

    for client in &config.active_clients {
        if client.is_container() {
            host.start_daemon(&client.name, &client.endpoint).await?;
        }
    }

    let registry = Arc::new(CanonicalizerRegistry::with_known_clients());
    let launchers = wiring::build_launchers(&config);

    let (tx, rx) = tokio::sync::mpsc::channel(20);
    let fork = if config.fork_config.is_empty() {
        None
    } else {
        Some(config.fork_config.clone())
    };
    let producer = tokio::spawn(run_producer(
        Box::new(SyntheticTestFactory::default()),
        store.clone(),
        config.host_tag.clone(),
        fork,
        tx,
    ));

    let mut executor = Executor::new(
        host.clone(),
        store,
        registry,
        launchers,
        config.force_save,
        config.enable_reporting,
    );

    let reason = executor.run(rx).await?;
    producer.abort();
    executor.shutdown(&config.client_names()).await;
    info!(?reason, summary = %executor.stats().summary_line(), "fuzzer shutting down");
    Ok(reason)
}

/// Mirrors the Python original's `TestExecutor.dry_run`: generate tests
/// and log them without ever touching the container backend.
async fn run_dry(config: &Config) {
    let store = FilesystemStore::new(config.testfiles_path(), config.logfiles_path(), config.artefacts.clone());
    let mut factory = SyntheticTestFactory::default();
    let fork = if config.fork_config.is_empty() {
        None
    } else {
        Some(config.fork_config.as_str())
    };

    let started = Instant::now();
    for n in 0..10u64 {
        let payload = fuzzer_generator::TestFactory::fill(&mut factory).await;
        let id = fuzzer_core::TestId::new(&config.host_tag, n);
        let rekeyed = fuzzer_generator::rekey_payload(payload, &id, fork);
        let case = fuzzer_core::TestCase::new(id, rekeyed);
        if let Err(e) = store.write(&case.filename, &case.payload) {
            warn!(error = %e, "failed to write dry-run test file");
            continue;
        }
        info!(n, filename = %case.filename, "generated statetest");
    }
    info!(elapsed = ?started.elapsed(), "dry run complete");
}

/// Mirrors the Python original's `-B/--benchmark`: times test-generation
/// throughput rather than running the full pipeline.
async fn run_benchmark(config: &Config) {
    let mut factory = SyntheticTestFactory::default();
    let started = Instant::now();
    let mut count = 0u64;
    while started.elapsed().as_secs() < 10 {
        let _ = fuzzer_generator::TestFactory::fill(&mut factory).await;
        count += 1;
    }
    let avg = started.elapsed().as_secs_f64() / count.max(1) as f64;
    info!(count, avg_seconds = avg, tests_per_sec = 1.0 / avg.max(f64::EPSILON), "benchmark complete");
    let _ = config;
}
