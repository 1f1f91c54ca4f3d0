use super::{HistogramBucket, SortedLatencies};

/// Number of equal-width buckets between the fastest and slowest sample.
pub const HISTOGRAM_BUCKETS: usize = 10;
/// Length of the bar for the fullest bucket.
pub const BAR_WIDTH: usize = 40;

/// Builds `HISTOGRAM_BUCKETS + 1` buckets; the last edge is the slowest sample
/// itself so every latency has a home.
pub(crate) fn build_histogram(latencies: &SortedLatencies) -> Vec<HistogramBucket> {
    let (Some(fastest), Some(slowest)) = (latencies.fastest(), latencies.slowest()) else {
        return Vec::new();
    };

    let width = (slowest - fastest) / HISTOGRAM_BUCKETS as f64;
    let mut bounds: Vec<f64> = (0..HISTOGRAM_BUCKETS)
        .map(|step| fastest + width * step as f64)
        .collect();
    bounds.push(slowest);

    let last = bounds.len().saturating_sub(1);
    let mut counts = vec![0usize; bounds.len()];
    let mut bucket = 0usize;
    for latency in latencies.as_slice() {
        while bucket < last && bounds.get(bucket).is_some_and(|bound| latency > bound) {
            bucket = bucket.saturating_add(1);
        }
        if let Some(count) = counts.get_mut(bucket) {
            *count = count.saturating_add(1);
        }
    }

    let max_count = counts.iter().copied().max().unwrap_or(0);
    bounds
        .into_iter()
        .zip(counts)
        .map(|(upper_bound, count)| HistogramBucket {
            upper_bound,
            count,
            bar_len: bar_length(count, max_count),
        })
        .collect()
}

fn bar_length(count: usize, max_count: usize) -> usize {
    count
        .saturating_mul(BAR_WIDTH)
        .checked_div(max_count)
        .unwrap_or(0)
}
