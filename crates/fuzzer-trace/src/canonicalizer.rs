use std::io::BufRead;

use serde_json::Value;

use crate::step::TraceStep;

/// A per-client pure transform from a raw trace byte stream to a lazy
/// sequence of canonical steps (spec §4.C). Implementations are opaque,
/// client-specific parsers; the registry in [`crate::registry`] is the
/// only piece of this crate that knows *which* canonicalizer applies to a
/// given client name.
///
/// The lifetime parameter on `canonicalize` (rather than a type parameter)
/// keeps the trait object-safe: a `CanonicalizerRegistry` stores these
/// behind `Arc<dyn Canonicalizer>`.
pub trait Canonicalizer: Send + Sync {
    fn canonicalize<'a>(
        &self,
        reader: Box<dyn BufRead + 'a>,
    ) -> Box<dyn Iterator<Item = TraceStep> + 'a>;
}

/// `geth`/`parity`/`hera` all emit one JSON object per line
/// (`{"pc":.., "op":.., "depth":..}` or similar), per spec §6's trace file
/// format note. This canonicalizer is shared by the three clients that use
/// that convention, differing only in which JSON keys they use — captured
/// via the small [`LineKeys`] descriptor rather than three near-identical
/// structs.
pub struct JsonLineCanonicalizer {
    keys: LineKeys,
}

#[derive(Debug, Clone, Copy)]
pub struct LineKeys {
    pub pc: &'static str,
    pub op: &'static str,
    pub depth: &'static str,
}

impl JsonLineCanonicalizer {
    pub const GETH: LineKeys = LineKeys {
        pc: "pc",
        op: "op",
        depth: "depth",
    };
    pub const PARITY: LineKeys = LineKeys {
        pc: "pc",
        op: "op",
        depth: "depth",
    };
    pub const HERA: LineKeys = LineKeys {
        pc: "pc",
        op: "opName",
        depth: "depth",
    };

    pub fn new(keys: LineKeys) -> Self {
        Self { keys }
    }
}

impl Canonicalizer for JsonLineCanonicalizer {
    fn canonicalize<'a>(
        &self,
        reader: Box<dyn BufRead + 'a>,
    ) -> Box<dyn Iterator<Item = TraceStep> + 'a> {
        let keys = self.keys;
        Box::new(reader.lines().filter_map(move |line| {
            let line = line.ok()?;
            let value: Value = serde_json::from_str(&line).ok()?;
            parse_json_step(&value, keys)
        }))
    }
}

fn parse_json_step(value: &Value, keys: LineKeys) -> Option<TraceStep> {
    let pc = value.get(keys.pc)?.as_u64()?;
    let op = value.get(keys.op)?.as_str()?.to_string();
    let depth = value
        .get(keys.depth)
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;
    Some(TraceStep::new(pc, op, depth))
}

/// `cpp` (aleth/cpp-ethereum's `testeth`) trace format is not line-oriented
/// JSON; it emits whitespace-separated fields per step
/// (`pc op depth ...`). This is a simplified, spec-faithful stand-in for
/// the real parser, which is explicitly out of scope (spec §1).
pub struct WhitespaceFieldCanonicalizer;

impl Canonicalizer for WhitespaceFieldCanonicalizer {
    fn canonicalize<'a>(
        &self,
        reader: Box<dyn BufRead + 'a>,
    ) -> Box<dyn Iterator<Item = TraceStep> + 'a> {
        Box::new(reader.lines().filter_map(|line| {
            let line = line.ok()?;
            let mut fields = line.split_whitespace();
            let pc = fields.next()?.parse::<u64>().ok()?;
            let op = fields.next()?.to_string();
            let depth = fields
                .next()
                .and_then(|d| d.parse::<usize>().ok())
                .unwrap_or(0);
            Some(TraceStep::new(pc, op, depth))
        }))
    }
}
