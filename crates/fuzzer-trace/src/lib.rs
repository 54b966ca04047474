//! Client-independent trace canonicalization, rolling statistics, and
//! structural trace comparison — spec §4.C (Trace Canonicalizer Registry)
//! and §4.G (Comparator & Reporter).

mod canonicalizer;
mod compare;
mod registry;
mod stats;
mod step;

pub use canonicalizer::{Canonicalizer, JsonLineCanonicalizer, LineKeys, WhitespaceFieldCanonicalizer};
pub use compare::{compare, summary, ComparisonResult, DIVERGENCE_MARKER};
pub use registry::CanonicalizerRegistry;
pub use stats::{RollingTraceStats, Stats, TraceStepStats};
pub use step::TraceStep;
