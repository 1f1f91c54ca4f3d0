use std::collections::BTreeMap;

use super::SortedLatencies;

/// Ranks reported in [`super::RunReport::latency_percentiles`].
pub const PERCENTILES: [u8; 7] = [10, 25, 50, 75, 90, 95, 99];

const PERCENT_DIVISOR: usize = 100;

/// Single pass over the samples: each rank takes the first sample whose
/// cumulative position (`index * 100 / len`) reaches it.
pub(crate) fn latency_percentiles(latencies: &SortedLatencies) -> BTreeMap<String, f64> {
    let len = latencies.len();
    let mut filled = BTreeMap::new();
    let mut targets = PERCENTILES.iter().copied().peekable();

    for (index, latency) in latencies.as_slice().iter().enumerate() {
        let Some(target) = targets.peek().copied() else {
            break;
        };
        let current = index
            .saturating_mul(PERCENT_DIVISOR)
            .checked_div(len)
            .unwrap_or(0);
        if current >= usize::from(target) {
            filled.insert(percentile_label(target), *latency);
            targets.next();
        }
    }

    filled
}

pub(crate) fn percentile_label(percentile: u8) -> String {
    format!("{}%", percentile)
}
