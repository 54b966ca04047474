use std::time::{Duration, Instant};

use fuzzer_trace::{RollingTraceStats, TraceStepStats};

/// Pass/fail counters, rolling trace statistics, and throughput,
/// encapsulated in the `Executor` exactly as spec §9 prescribes
/// ("encapsulate statistics in the Executor").
#[derive(Debug)]
pub struct ExecutorStats {
    passed: u64,
    failed: u64,
    started_at: Instant,
    trace_stats: RollingTraceStats,
}

impl ExecutorStats {
    pub fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            started_at: Instant::now(),
            trace_stats: RollingTraceStats::default(),
        }
    }

    pub fn record_pass(&mut self, step_stats: TraceStepStats) {
        self.passed += 1;
        self.trace_stats.record(step_stats);
    }

    pub fn record_fail(&mut self, step_stats: TraceStepStats) {
        self.failed += 1;
        self.trace_stats.record(step_stats);
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn throughput_per_sec(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.total() as f64 / secs
        }
    }

    /// One summary line per completed test (spec §4.G): counters,
    /// throughput, mean/max trace length, zero-trace rate.
    pub fn summary_line(&self) -> String {
        format!(
            "passed={} failed={} total={} throughput={:.2}/s mean_len={:.1} max_len={} zero_rate={:.3}",
            self.passed,
            self.failed,
            self.total(),
            self.throughput_per_sec(),
            self.trace_stats.mean_trace_len(),
            self.trace_stats.max_trace_len(),
            self.trace_stats.zero_trace_rate(),
        )
    }
}

impl Default for ExecutorStats {
    fn default() -> Self {
        Self::new()
    }
}
