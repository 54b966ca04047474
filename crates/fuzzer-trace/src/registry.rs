use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::canonicalizer::{Canonicalizer, JsonLineCanonicalizer, WhitespaceFieldCanonicalizer};
use crate::stats::{Stats, TraceStepStats};
use crate::step::TraceStep;

/// Static `client-name -> canonicalizer` mapping (spec §4.C). Built once at
/// startup; a redesign of the Python source's dynamic
/// `self.canonicalizers[client_name]` dict-of-functions lookup into a typed
/// capability set, per spec §9.
#[derive(Clone)]
pub struct CanonicalizerRegistry {
    canonicalizers: HashMap<String, Arc<dyn Canonicalizer>>,
}

impl std::fmt::Debug for CanonicalizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalizerRegistry")
            .field("clients", &self.canonicalizers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CanonicalizerRegistry {
    /// The five canonicalizers named in spec §2/§4.C: geth, parity, cpp,
    /// hera, py. `py` (py-evm) shares geth's line convention in practice;
    /// kept as a distinct registration point so a real implementation can
    /// be swapped in without touching callers.
    pub fn with_known_clients() -> Self {
        let mut registry = Self::empty();
        registry.register("geth", JsonLineCanonicalizer::new(JsonLineCanonicalizer::GETH));
        registry.register(
            "parity",
            JsonLineCanonicalizer::new(JsonLineCanonicalizer::PARITY),
        );
        registry.register("hera", JsonLineCanonicalizer::new(JsonLineCanonicalizer::HERA));
        registry.register("cpp", WhitespaceFieldCanonicalizer);
        registry.register(
            "py",
            JsonLineCanonicalizer::new(JsonLineCanonicalizer::GETH),
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            canonicalizers: HashMap::new(),
        }
    }

    pub fn register(&mut self, client: impl Into<String>, canonicalizer: impl Canonicalizer + 'static) {
        self.canonicalizers.insert(client.into(), Arc::new(canonicalizer));
    }

    pub fn get(&self, client: &str) -> Option<&Arc<dyn Canonicalizer>> {
        self.canonicalizers.get(client)
    }

    /// Canonicalizes a trace file for `client`, wrapped in [`Stats`] so the
    /// caller gets both the canonical step list and its accumulated
    /// [`TraceStepStats`] in one pass (spec §4.C / §4.G).
    ///
    /// If the file is missing (a race with the exec, spec §4.C/§7.3), this
    /// returns an empty trace and default stats rather than erroring — the
    /// caller is responsible for logging the missing-trace event alongside
    /// the test's socket event log. The final `bool` reports whether the
    /// trace file was found at all.
    pub fn canonicalize_file(&self, client: &str, path: &Path) -> (Vec<TraceStep>, TraceStepStats, bool) {
        let Some(canonicalizer) = self.canonicalizers.get(client) else {
            tracing::warn!(client, "no canonicalizer registered for this client name");
            return (Vec::new(), TraceStepStats::default(), false);
        };

        let Ok(file) = std::fs::File::open(path) else {
            return (Vec::new(), TraceStepStats::default(), false);
        };

        let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
        let mut stats_iter = Stats::new(canonicalizer.canonicalize(reader));
        let steps: Vec<TraceStep> = (&mut stats_iter).collect();
        let stats = stats_iter.finish();
        (steps, stats, true)
    }
}
