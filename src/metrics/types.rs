use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of a single dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Transport or body-read failure, rendered as its display message.
    pub error: Option<String>,
    /// Status code of the exchange, `0` when no response was received.
    pub status_code: u16,
    /// Wall-clock time from send to completion, error path included.
    pub duration: Duration,
    /// Advertised response length, `None` when unknown.
    pub content_length: Option<u64>,
}

impl Outcome {
    #[must_use]
    pub const fn success(status_code: u16, duration: Duration, content_length: Option<u64>) -> Self {
        Self {
            error: None,
            status_code,
            duration,
            content_length,
        }
    }

    #[must_use]
    pub const fn failure(error: String, duration: Duration) -> Self {
        Self {
            error: Some(error),
            status_code: 0,
            duration,
            content_length: None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_seconds: f64,
    pub fastest: f64,
    pub slowest: f64,
    pub average: f64,
    pub requests_per_second: f64,
    pub total_size: u64,
    /// Only present when at least one successful response reported a size.
    pub size_per_request: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Inclusive upper edge of the bucket, in seconds.
    pub upper_bound: f64,
    pub count: usize,
    /// Bar length scaled so the fullest bucket spans [`super::BAR_WIDTH`].
    pub bar_len: usize,
}

/// Aggregate view of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: Summary,
    pub status_code_distribution: BTreeMap<u16, usize>,
    /// Keyed by labels such as `"50%"`; ranks with no qualifying sample are absent.
    pub latency_percentiles: BTreeMap<String, f64>,
    pub histogram: Vec<HistogramBucket>,
    pub error_distribution: BTreeMap<String, usize>,
}

impl RunReport {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.status_code_distribution
            .values()
            .fold(0usize, |acc, count| acc.saturating_add(*count))
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_distribution
            .values()
            .fold(0usize, |acc, count| acc.saturating_add(*count))
    }

    /// Every dispatched request lands in exactly one of the two distributions.
    #[must_use]
    pub fn total_outcomes(&self) -> usize {
        self.success_count().saturating_add(self.error_count())
    }
}

/// Latencies in seconds, ascending.
///
/// Percentile and histogram construction walk the samples with forward-only
/// cursors, so they only accept this type.
#[derive(Debug, Clone, Default)]
pub(crate) struct SortedLatencies(Vec<f64>);

impl SortedLatencies {
    pub(crate) fn from_unsorted(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        Self(values)
    }

    pub(crate) fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Summed in ascending order so the result does not depend on arrival order.
    pub(crate) fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub(crate) fn fastest(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub(crate) fn slowest(&self) -> Option<f64> {
        self.0.last().copied()
    }
}
