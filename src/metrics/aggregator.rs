use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::{
    Outcome, RunReport, SortedLatencies, Summary, build_histogram, latency_percentiles,
};

/// Collects outcomes for one run and reduces them into a [`RunReport`].
///
/// Recording and draining may happen in any order; [`Aggregator::finalize`]
/// consumes the aggregator, so a report is built exactly once.
#[derive(Debug, Default)]
pub struct Aggregator {
    latencies: Vec<f64>,
    status_codes: BTreeMap<u16, usize>,
    errors: BTreeMap<String, usize>,
    size_total: u64,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            latencies: Vec::with_capacity(expected),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome.error {
            Some(message) => {
                let count = self.errors.entry(message).or_insert(0);
                *count = count.saturating_add(1);
            }
            None => {
                self.latencies.push(outcome.duration.as_secs_f64());
                let count = self.status_codes.entry(outcome.status_code).or_insert(0);
                *count = count.saturating_add(1);
                if let Some(size) = outcome.content_length {
                    self.size_total = self.size_total.saturating_add(size);
                }
            }
        }
    }

    /// Takes everything already buffered in `results` without waiting.
    ///
    /// Callers must only drain once every producer has finished; anything
    /// sent afterwards is not seen.
    pub fn drain(&mut self, results: &mut mpsc::Receiver<Outcome>) -> usize {
        let mut drained = 0usize;
        while let Ok(outcome) = results.try_recv() {
            self.record(outcome);
            drained = drained.saturating_add(1);
        }
        debug!("Drained {} outcomes", drained);
        drained
    }

    /// Builds the report; `total` is the wall-clock span of the whole run.
    #[must_use]
    pub fn finalize(self, total: Duration) -> RunReport {
        let success_count = self.latencies.len();
        let total_seconds = total.as_secs_f64();
        let latencies = SortedLatencies::from_unsorted(self.latencies);

        let mut summary = Summary {
            total_seconds,
            ..Summary::default()
        };
        if let (Some(fastest), Some(slowest)) = (latencies.fastest(), latencies.slowest()) {
            let successes = success_count as f64;
            summary.fastest = fastest;
            summary.slowest = slowest;
            summary.average = latencies.sum() / successes;
            summary.requests_per_second = if total_seconds > 0.0 {
                successes / total_seconds
            } else {
                0.0
            };
            if self.size_total > 0 {
                summary.total_size = self.size_total;
                summary.size_per_request = u64::try_from(success_count)
                    .ok()
                    .and_then(|count| self.size_total.checked_div(count));
            }
        }

        RunReport {
            summary,
            status_code_distribution: self.status_codes,
            latency_percentiles: latency_percentiles(&latencies),
            histogram: build_histogram(&latencies),
            error_distribution: self.errors,
        }
    }
}
