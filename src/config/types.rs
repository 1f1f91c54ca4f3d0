use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::http::{
    BodySource, DEFAULT_CONCURRENCY, DEFAULT_REQUESTS, RequestTemplate, RunOptions,
    TransportOptions,
};

use super::{parse_basic_auth, parse_header};

/// Connect timeout applied when the config does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, String> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}

/// Everything needed to describe one run. Unset fields fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    /// `"Key: Value"` entries.
    pub headers: Option<Vec<String>>,
    pub body: Option<String>,
    /// `"username:password"`.
    pub basic_auth: Option<String>,
    #[serde(alias = "n")]
    pub requests: Option<usize>,
    #[serde(alias = "c", alias = "workers")]
    pub concurrency: Option<usize>,
    #[serde(alias = "rate")]
    pub qps: Option<u64>,
    /// Connect timeout; `0` disables it.
    pub timeout: Option<DurationValue>,
    pub insecure: Option<bool>,
    pub disable_compression: Option<bool>,
    pub disable_keepalive: Option<bool>,
    #[serde(alias = "proxy_url")]
    pub proxy: Option<String>,
    pub read_all: Option<bool>,
}

impl RunConfig {
    /// Builds the request template described by this config.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is missing or invalid, or a header or
    /// basic-auth entry is malformed.
    pub fn request_template(&self) -> AppResult<RequestTemplate> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AppError::config(ConfigError::MissingUrl))?;
        let method = Method::from(self.method.unwrap_or_default());
        let mut template = RequestTemplate::parse(method, url)?;

        for entry in self.headers.iter().flatten() {
            let (name, value) = parse_header(entry)?;
            template = template.header(&name, &value)?;
        }

        if let Some(credentials) = self.basic_auth.as_deref() {
            let (username, password) = parse_basic_auth(credentials)?;
            template = template.basic_auth(&username, &password)?;
        }

        if let Some(body) = self.body.as_ref() {
            template = template.with_body(BodySource::Text(body.clone()));
        }

        Ok(template)
    }

    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            requests: self.requests.unwrap_or(DEFAULT_REQUESTS),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            qps: self.qps.unwrap_or(0),
            read_all: self.read_all.unwrap_or(false),
            body_override: None,
        }
    }

    /// # Errors
    ///
    /// Returns an error when the timeout cannot be parsed.
    pub fn transport_options(&self) -> AppResult<TransportOptions> {
        let timeout = match self.timeout.as_ref() {
            Some(value) => value.to_duration().map_err(|message| {
                AppError::config(ConfigError::InvalidDuration {
                    field: "timeout",
                    message,
                })
            })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(TransportOptions {
            timeout: Some(timeout).filter(|timeout| !timeout.is_zero()),
            allow_insecure: self.insecure.unwrap_or(false),
            disable_compression: self.disable_compression.unwrap_or(false),
            disable_keep_alives: self.disable_keepalive.unwrap_or(false),
            proxy: self.proxy.clone(),
        })
    }
}
