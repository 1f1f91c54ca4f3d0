mod barrier;
mod worker;

use std::sync::Arc;

use reqwest::Request;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    config::RunConfig,
    error::{AppError, AppResult, HttpError, ValidationError},
    metrics::{Aggregator, Outcome, RunReport},
};

use super::rate::Throttle;
use super::template::RequestTemplate;
use super::transport::{ReqwestTransport, Transport};
use barrier::CompletionBarrier;
use worker::{WorkerContext, run_worker};

#[cfg(test)]
pub(crate) use worker::execute_request;

/// Default number of requests per run.
pub const DEFAULT_REQUESTS: usize = 200;
/// Default number of concurrent workers.
pub const DEFAULT_CONCURRENCY: usize = 50;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Total requests to dispatch.
    pub requests: usize,
    /// Number of workers sending in parallel.
    pub concurrency: usize,
    /// Target dispatch rate per second, `0` for unpaced.
    pub qps: u64,
    /// Read every response body to the end before recording the outcome.
    pub read_all: bool,
    /// Replaces the template body on every dispatched copy.
    pub body_override: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            requests: DEFAULT_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
            qps: 0,
            read_all: false,
            body_override: None,
        }
    }
}

/// One configured load run: a template, the fan-out settings, and the
/// transport that carries the requests.
#[derive(Debug)]
pub struct LoadTest<T = ReqwestTransport> {
    template: Arc<RequestTemplate>,
    options: RunOptions,
    transport: Arc<T>,
}

impl LoadTest<ReqwestTransport> {
    /// Builds the template, run options, and HTTP client from a config.
    ///
    /// # Errors
    ///
    /// Returns an error when the config is incomplete or invalid, or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &RunConfig) -> AppResult<Self> {
        let template = config.request_template()?;
        let transport = ReqwestTransport::new(&config.transport_options()?)?;
        Self::new(template, config.run_options(), transport)
    }
}

impl<T: Transport> LoadTest<T> {
    /// # Errors
    ///
    /// Returns an error when `options.concurrency` is zero.
    pub fn new(template: RequestTemplate, options: RunOptions, transport: T) -> AppResult<Self> {
        if options.concurrency == 0 {
            return Err(AppError::validation(ValidationError::ZeroConcurrency));
        }
        Ok(Self {
            template: Arc::new(template),
            options,
            transport: Arc::new(transport),
        })
    }

    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    #[must_use]
    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// Dispatches every request and reduces the outcomes into a report.
    ///
    /// Individual failures end up in the report's error distribution; the run
    /// itself cannot fail.
    pub async fn run(&self) -> RunReport {
        let requests = self.options.requests;
        let capacity = requests.max(1);
        let (jobs_tx, jobs_rx) = flume::bounded::<Request>(capacity);
        let (results_tx, mut results_rx) = mpsc::channel::<Outcome>(capacity);
        let completions = Arc::new(CompletionBarrier::new(requests));

        info!(
            "Dispatching {} {} {} requests over {} workers",
            requests,
            self.template.method(),
            self.template.url(),
            self.options.concurrency
        );

        let start = Instant::now();
        let mut workers = JoinSet::new();
        for id in 0..self.options.concurrency {
            workers.spawn(run_worker(WorkerContext {
                id,
                jobs: jobs_rx.clone(),
                results: results_tx.clone(),
                completions: Arc::clone(&completions),
                transport: Arc::clone(&self.transport),
                read_all: self.options.read_all,
            }));
        }
        drop(results_tx);
        drop(jobs_rx);

        let throttle = Throttle::new(self.options.qps);
        self.enqueue_jobs(jobs_tx, throttle).await;

        tokio::select! {
            () = completions.wait() => {}
            () = join_workers(&mut workers) => {
                warn!(
                    "All workers exited with {} requests unaccounted for.",
                    completions.remaining()
                );
            }
        }
        join_workers(&mut workers).await;
        let total = start.elapsed();

        let mut aggregator = Aggregator::with_capacity(requests);
        aggregator.drain(&mut results_rx);
        let report = aggregator.finalize(total);

        info!(
            "Run finished in {:.3}s: {} ok, {} errors, {:.2} req/s",
            report.summary.total_seconds,
            report.success_count(),
            report.error_count(),
            report.summary.requests_per_second
        );
        report
    }

    /// Runs on a dedicated multi-threaded runtime and blocks until done.
    ///
    /// # Errors
    ///
    /// Returns an error when called from inside a tokio runtime (use
    /// [`LoadTest::run`] there), or when the runtime cannot be created.
    pub fn run_blocking(&self) -> AppResult<RunReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(AppError::http(HttpError::NestedRuntime));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| AppError::http(HttpError::BuildRuntimeFailed { source: err }))?;
        Ok(runtime.block_on(self.run()))
    }

    /// Queues one fresh copy of the template per request, then closes the
    /// queue by dropping the sender.
    async fn enqueue_jobs(&self, jobs: flume::Sender<Request>, mut throttle: Option<Throttle>) {
        let body_override = self.options.body_override.as_deref();
        for _ in 0..self.options.requests {
            if let Some(throttle) = throttle.as_mut() {
                throttle.wait().await;
            }
            if jobs
                .send_async(self.template.clone_request(body_override))
                .await
                .is_err()
            {
                warn!("Job queue closed before every request was queued.");
                break;
            }
        }
    }
}

async fn join_workers(workers: &mut JoinSet<()>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            warn!("Worker task failed: {}", err);
        }
    }
}
