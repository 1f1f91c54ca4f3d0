use std::sync::Arc;

use reqwest::Request;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::http::transport::Transport;
use crate::metrics::Outcome;

use super::barrier::CompletionBarrier;

pub(super) struct WorkerContext<T> {
    pub(super) id: usize,
    pub(super) jobs: flume::Receiver<Request>,
    pub(super) results: mpsc::Sender<Outcome>,
    pub(super) completions: Arc<CompletionBarrier>,
    pub(super) transport: Arc<T>,
    pub(super) read_all: bool,
}

/// Pulls jobs until the queue is closed and empty.
pub(super) async fn run_worker<T: Transport>(context: WorkerContext<T>) {
    let mut handled: u64 = 0;
    while let Ok(request) = context.jobs.recv_async().await {
        let outcome = execute_request(context.transport.as_ref(), request, context.read_all).await;
        if context.results.send(outcome).await.is_err() {
            warn!("Worker {} could not deliver an outcome.", context.id);
        }
        context.completions.complete();
        handled = handled.saturating_add(1);
    }
    debug!("Worker {} finished after {} requests", context.id, handled);
}

/// Sends one request and turns whatever happens into an [`Outcome`].
///
/// The elapsed time covers the error path and, with `read_all`, the body read.
pub(crate) async fn execute_request<T: Transport + ?Sized>(
    transport: &T,
    request: Request,
    read_all: bool,
) -> Outcome {
    let start = Instant::now();
    match transport.send(request).await {
        Ok(response) => {
            let status_code = response.status();
            let content_length = response.content_length();
            let error = if read_all {
                match response.drain().await {
                    Ok(_) => None,
                    Err(err) => {
                        debug!("Failed to read response body: {}", err);
                        Some(err.chain_message())
                    }
                }
            } else {
                drop(response);
                None
            };
            Outcome {
                error,
                status_code,
                duration: start.elapsed(),
                content_length,
            }
        }
        Err(err) => {
            debug!("Request failed: {}", err);
            Outcome::failure(err.chain_message(), start.elapsed())
        }
    }
}
