//! HTTP transport used by [`Client`](crate::Client).
//!
//! The client only builds [`ApiRequest`]s and interprets [`ApiResponse`]s;
//! anything implementing [`Transport`] can carry them. [`ReqwestTransport`]
//! is the default and owns the authentication and identification headers.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::{Error, Result};

/// Library and runtime product tokens sent as `User-Agent`.
pub const USER_AGENT_VALUE: &str = concat!(
    "resend-rust/",
    env!("CARGO_PKG_VERSION"),
    " rust/",
    env!("CARGO_PKG_RUST_VERSION")
);

/// A request against the Resend API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Unencoded path segments, e.g. `["audiences", "<id>", "contacts"]`.
    pub segments: Vec<String>,
    /// Serialized JSON body.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    /// Attach `body` serialized as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body).map_err(Error::Encode)?);
        Ok(self)
    }

    /// Path as sent on the wire, before percent-encoding.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Status and raw body of an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends an [`ApiRequest`] and returns whatever the server answered.
///
/// Implementations must not interpret the status code; a 4xx or 5xx answer
/// is still `Ok`. Only failures to complete the exchange are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// [`Transport`] backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
}

impl ReqwestTransport {
    /// Wrap `http`, sending every request to `base_url` with the bearer `api_token`.
    ///
    /// # Errors
    /// Fails if `base_url` cannot carry a path or the token is not a valid
    /// header value. No network I/O happens here.
    pub fn new(http: reqwest::Client, base_url: Url, api_token: &str) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_token}"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        Ok(Self {
            http,
            base_url,
            headers,
        })
    }

    /// Resolve the request path against the base URL, percent-encoding each segment.
    fn url(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request)?;

        let mut builder = self
            .http
            .request(request.method, url)
            .headers(self.headers.clone());

        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = builder.send().await.inspect_err(|err| {
            tracing::error!("Resend request failed: {err}");
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
