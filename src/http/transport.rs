use std::error::Error as _;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use reqwest::{Client, Proxy, Request};
use thiserror::Error;
use tracing::error;

use crate::error::{AppError, AppResult, HttpError, ValidationError};

pub const DEFAULT_USER_AGENT: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));

pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Display text of the error followed by each of its sources.
    #[must_use]
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !message.ends_with(&cause_text) {
                message.push_str(": ");
                message.push_str(&cause_text);
            }
            source = cause.source();
        }
        message
    }
}

/// Response head plus the still-unread body.
///
/// Dropping the response closes the body.
pub struct Response {
    status: u16,
    content_length: Option<u64>,
    body: BodyStream,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, content_length: Option<u64>, body: BodyStream) -> Self {
        Self {
            status,
            content_length,
            body,
        }
    }

    #[must_use]
    pub fn without_body(status: u16) -> Self {
        Self::new(
            status,
            Some(0),
            stream::empty::<Result<Bytes, TransportError>>().boxed(),
        )
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub const fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Reads the body to the end and returns the number of bytes seen.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the body stream.
    pub async fn drain(mut self) -> Result<u64, TransportError> {
        let mut total_bytes: u64 = 0;
        while let Some(chunk) = self.body.next().await {
            let bytes = chunk?;
            total_bytes =
                total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
        }
        Ok(total_bytes)
    }
}

/// Sends one request and hands back the response or the failure.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// Connection-level knobs passed straight through to the HTTP client.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Applied as the connect timeout (TCP connect plus TLS handshake).
    pub timeout: Option<Duration>,
    pub allow_insecure: bool,
    pub disable_compression: bool,
    pub disable_keep_alives: bool,
    pub proxy: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the proxy URL is invalid or the client cannot be
    /// built.
    pub fn new(options: &TransportOptions) -> AppResult<Self> {
        let mut client_builder = Client::builder().user_agent(DEFAULT_USER_AGENT);

        if let Some(timeout) = options.timeout.filter(|timeout| !timeout.is_zero()) {
            client_builder = client_builder.connect_timeout(timeout);
        }

        if options.disable_keep_alives {
            client_builder = client_builder
                .pool_max_idle_per_host(0)
                .pool_idle_timeout(Some(Duration::from_secs(0)));
        }

        if options.disable_compression {
            client_builder = client_builder.no_gzip().no_brotli().no_deflate();
        }

        if options.allow_insecure {
            client_builder = client_builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        if let Some(proxy_url) = options.proxy.as_ref() {
            let proxy = Proxy::all(proxy_url).map_err(|err| {
                error!("Invalid proxy URL '{}': {}", proxy_url, err);
                AppError::validation(ValidationError::InvalidProxyUrl {
                    url: proxy_url.clone(),
                    source: err,
                })
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::http(HttpError::BuildClientFailed { source: err })
        })?;
        Ok(Self { client })
    }

    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from))
            .boxed();
        Ok(Response::new(status, content_length, body))
    }
}
