use std::collections::BTreeMap;

use crate::step::TraceStep;

/// Marker line inserted at the first point two clients' canonical traces
/// disagree (spec §3/§4.G).
pub const DIVERGENCE_MARKER: &str = "[!!]";

/// Result of comparing every client's canonical trace for one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub equivalent: bool,
    /// Concatenated per-step lines from all clients, in client order, with
    /// [`DIVERGENCE_MARKER`] inserted at the divergence index if any.
    pub combined: Vec<String>,
    pub divergence_index: Option<usize>,
}

/// Structurally compares each client's canonical trace, aligning by step
/// index. A run is equivalent iff all traces are pairwise equal from index
/// 0 up to the shortest trace's length *and* all lengths are equal (spec
/// §4.G — this spec fixes the Python original's unstated alignment rule:
/// unequal lengths are never equivalent).
///
/// `client_order` fixes the iteration/printing order (spec's `clientNames`)
/// so the combined trace and divergence index are deterministic regardless
/// of map iteration order.
pub fn compare(
    traces: &BTreeMap<String, Vec<TraceStep>>,
    client_order: &[String],
) -> ComparisonResult {
    let lists: Vec<&Vec<TraceStep>> = client_order
        .iter()
        .map(|name| traces.get(name).map(Vec::as_slice).unwrap_or(&[]))
        .collect();

    let shortest = lists.iter().map(|l| l.len()).min().unwrap_or(0);
    let lengths_equal = lists.iter().all(|l| l.len() == lists[0].len());

    let mut divergence_index = None;
    for i in 0..shortest {
        let first = lists[0][i].to_line();
        if !lists.iter().all(|l| l[i].to_line() == first) {
            divergence_index = Some(i);
            break;
        }
    }

    let equivalent = divergence_index.is_none() && lengths_equal;

    // When lengths differ but every common step agrees, the divergence is
    // "the point past the shortest trace" — the first index where at least
    // one client has no further step.
    let divergence_index = if divergence_index.is_none() && !lengths_equal {
        Some(shortest)
    } else {
        divergence_index
    };

    let combined = build_combined(client_order, &lists, divergence_index);

    ComparisonResult {
        equivalent,
        combined,
        divergence_index,
    }
}

fn build_combined(
    client_order: &[String],
    lists: &[&Vec<TraceStep>],
    divergence_index: Option<usize>,
) -> Vec<String> {
    let mut out = Vec::new();
    let max_len = lists.iter().map(|l| l.len()).max().unwrap_or(0);

    for i in 0..max_len {
        if divergence_index == Some(i) {
            out.push(DIVERGENCE_MARKER.to_string());
        }
        for (client, list) in client_order.iter().zip(lists.iter()) {
            let line = list
                .get(i)
                .map(|s| s.to_line().to_string())
                .unwrap_or_else(|| "<missing>".to_string());
            out.push(format!("{client}: {line}"));
        }
    }
    if divergence_index == Some(max_len) {
        out.push(DIVERGENCE_MARKER.to_string());
    }
    out
}

/// Up to `before` steps preceding the divergence marker, and up to `after`
/// steps following it (spec §4.G `get_summary`, defaults 20/5).
pub fn summary(combined: &[String], before: usize, after: usize) -> Vec<String> {
    let divergence_pos = combined.iter().position(|l| l == DIVERGENCE_MARKER);

    let Some(pos) = divergence_pos else {
        return combined.to_vec();
    };

    let start = pos.saturating_sub(before);
    let end = (pos + 1 + after).min(combined.len());
    combined[start..end].to_vec()
}
