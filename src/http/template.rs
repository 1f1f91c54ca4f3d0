use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use bytes::Bytes;
use reqwest::{
    Body, Method, Request, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};

use crate::error::{AppError, AppResult, ValidationError};

/// Produces a fresh streaming body for every dispatched copy.
pub type BodyFactory = Arc<dyn Fn() -> Body + Send + Sync>;

/// Where a dispatched request gets its body from.
#[derive(Clone, Default)]
pub enum BodySource {
    #[default]
    Empty,
    Text(String),
    Bytes(Bytes),
    /// Streams are single-use, so the template keeps the recipe instead.
    Stream(BodyFactory),
}

impl BodySource {
    pub fn stream<F>(factory: F) -> Self
    where
        F: Fn() -> Body + Send + Sync + 'static,
    {
        BodySource::Stream(Arc::new(factory))
    }

    fn to_body(&self) -> Option<Body> {
        match self {
            BodySource::Empty => None,
            BodySource::Text(text) => Some(Body::from(text.clone())),
            BodySource::Bytes(bytes) => Some(Body::from(bytes.clone())),
            BodySource::Stream(factory) => Some(factory()),
        }
    }
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodySource::Empty => f.write_str("Empty"),
            BodySource::Text(text) => f.debug_tuple("Text").field(text).finish(),
            BodySource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            BodySource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Read-only description of the request every worker sends.
///
/// The engine never hands the template itself to a worker; each dispatch gets
/// its own [`Request`] from [`RequestTemplate::clone_request`].
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: BodySource,
}

impl RequestTemplate {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: BodySource::Empty,
        }
    }

    /// Parses `url` and builds a template for it.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL cannot be parsed.
    pub fn parse(method: Method, url: &str) -> AppResult<Self> {
        let parsed = Url::parse(url).map_err(|err| {
            AppError::validation(ValidationError::InvalidUrl {
                url: url.to_owned(),
                source: err,
            })
        })?;
        Ok(Self::new(method, parsed))
    }

    /// Shorthand for a `GET` template.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL cannot be parsed.
    pub fn get(url: &str) -> AppResult<Self> {
        Self::parse(Method::GET, url)
    }

    /// Appends a header, keeping earlier values for the same name.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or value is not a valid header.
    pub fn header(mut self, name: &str, value: &str) -> AppResult<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderName {
                header: name.to_owned(),
                source: err,
            })
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderValue {
                header: name.to_owned(),
                source: err,
            })
        })?;
        self.headers.append(header_name, header_value);
        Ok(self)
    }

    /// Sets `Authorization: Basic base64(username:password)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the encoded credential is not a valid header value.
    pub fn basic_auth(mut self, username: &str, password: &str) -> AppResult<Self> {
        let token = format!("{}:{}", username, password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(token.as_bytes());
        let mut value = HeaderValue::from_str(&format!("Basic {}", encoded)).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderValue {
                header: AUTHORIZATION.as_str().to_owned(),
                source: err,
            })
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    #[must_use]
    pub fn with_body(mut self, body: BodySource) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub const fn body(&self) -> &BodySource {
        &self.body
    }

    /// Builds an independent request: headers are copied, and the body is
    /// created fresh from `body_override` when given, else from the template.
    #[must_use]
    pub fn clone_request(&self, body_override: Option<&str>) -> Request {
        let mut request = Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        *request.body_mut() = match body_override {
            Some(body) => Some(Body::from(body.to_owned())),
            None => self.body.to_body(),
        };
        request
    }
}
