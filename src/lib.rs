//! Concurrent HTTP load generation.
//!
//! A [`http::LoadTest`] clones a [`http::RequestTemplate`] once per request,
//! optionally paces the clones to a target rate, fans them out over a fixed
//! pool of workers, and reduces every response (or failure) into a
//! [`metrics::RunReport`]: throughput, latency percentiles, a latency
//! histogram, and status-code and error distributions.
//!
//! Transport failures never abort a run; they are counted in the report.
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;

pub use config::{RunConfig, load_config};
pub use error::{AppError, AppResult};
pub use http::{LoadTest, RequestTemplate, RunOptions};
pub use metrics::RunReport;
