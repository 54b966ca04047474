use std::collections::VecDeque;

use crate::step::TraceStep;

/// Depth/opcode accounting for a single trace, accumulated while the trace
/// is consumed — mirrors the Python `Stats.traceStats` generator wrapper,
/// which never buffers the full canonical trace in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStepStats {
    pub max_depth: usize,
    pub constantinople_ops: usize,
    pub len: usize,
}

/// Wraps an iterator of [`TraceStep`], yielding every step unchanged while
/// accumulating [`TraceStepStats`] as a side effect. Call [`Stats::finish`]
/// once the wrapped iterator is exhausted to read the result.
pub struct Stats<I> {
    inner: I,
    acc: TraceStepStats,
}

impl<I> Stats<I>
where
    I: Iterator<Item = TraceStep>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            acc: TraceStepStats::default(),
        }
    }

    /// Consumes the rest of the wrapped iterator and returns the result.
    pub fn finish(mut self) -> TraceStepStats {
        for _ in &mut self {}
        self.acc
    }
}

impl<I> Iterator for Stats<I>
where
    I: Iterator<Item = TraceStep>,
{
    type Item = TraceStep;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.inner.next()?;
        self.acc.len += 1;
        self.acc.max_depth = self.acc.max_depth.max(step.depth);
        if step.is_constantinople_op() {
            self.acc.constantinople_ops += 1;
        }
        Some(step)
    }
}

/// Rolling per-scheduler statistics: the last 100 samples of trace length,
/// max depth, and Constantinople-opcode count, plus pass/fail/throughput
/// counters. Lives inside the `Executor` (see `fuzzer-core`), never as
/// global/process-wide state (spec §9).
#[derive(Debug)]
pub struct RollingTraceStats {
    capacity: usize,
    trace_lengths: VecDeque<usize>,
    max_depths: VecDeque<usize>,
    constantinople_ops: VecDeque<usize>,
}

impl RollingTraceStats {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            trace_lengths: VecDeque::with_capacity(capacity),
            max_depths: VecDeque::with_capacity(capacity),
            constantinople_ops: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, sample: TraceStepStats) {
        push_bounded(&mut self.trace_lengths, sample.len, self.capacity);
        push_bounded(&mut self.max_depths, sample.max_depth, self.capacity);
        push_bounded(
            &mut self.constantinople_ops,
            sample.constantinople_ops,
            self.capacity,
        );
    }

    pub fn mean_trace_len(&self) -> f64 {
        mean(&self.trace_lengths)
    }

    pub fn max_trace_len(&self) -> usize {
        self.trace_lengths.iter().copied().max().unwrap_or(0)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depths.iter().copied().max().unwrap_or(0)
    }

    pub fn zero_trace_rate(&self) -> f64 {
        if self.trace_lengths.is_empty() {
            return 0.0;
        }
        let zeros = self.trace_lengths.iter().filter(|&&l| l == 0).count();
        zeros as f64 / self.trace_lengths.len() as f64
    }

    pub fn sample_count(&self) -> usize {
        self.trace_lengths.len()
    }
}

impl Default for RollingTraceStats {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(deque: &mut VecDeque<usize>, value: usize, capacity: usize) {
    if deque.len() == capacity {
        deque.pop_front();
    }
    deque.push_back(value);
}

fn mean(deque: &VecDeque<usize>) -> f64 {
    if deque.is_empty() {
        return 0.0;
    }
    deque.iter().sum::<usize>() as f64 / deque.len() as f64
}
