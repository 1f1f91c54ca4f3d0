//! Request templating, pacing, and the worker pool that drives a run.
mod dispatch;
mod rate;
mod template;
mod transport;


pub use dispatch::{DEFAULT_CONCURRENCY, DEFAULT_REQUESTS, LoadTest, RunOptions};
pub use rate::Throttle;
pub use template::{BodyFactory, BodySource, RequestTemplate};
pub use transport::{
    BodyStream, DEFAULT_USER_AGENT, ReqwestTransport, Response, Transport, TransportError,
    TransportOptions,
};
