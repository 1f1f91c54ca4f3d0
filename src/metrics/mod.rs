//! Outcome records, the run aggregator, and the final report shape.
mod aggregator;
mod histogram;
mod percentiles;
mod types;


pub use aggregator::Aggregator;
pub use histogram::{BAR_WIDTH, HISTOGRAM_BUCKETS};
pub use percentiles::PERCENTILES;
pub use types::{HistogramBucket, Outcome, RunReport, Summary};

pub(crate) use histogram::build_histogram;
pub(crate) use percentiles::latency_percentiles;
pub(crate) use types::SortedLatencies;
