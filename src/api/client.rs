//! HTTP client for the storefront API

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::common::config::TargetConfig;
use crate::common::{Error, Result};

use super::session::Session;
use super::types::Method;

/// Status and raw body of a completed request
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// A request that never produced a complete response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("{}", describe_chain(.0))]
    Request(#[from] reqwest::Error),
}

/// Flatten an error and its sources into one line
///
/// reqwest hides the interesting part ("Connection refused") in the source
/// chain.
fn describe_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Build `<base_url>/<prefix>/` as a joinable URL
pub fn api_root(base_url: &str, prefix: &str) -> Result<Url> {
    let base = Url::parse(base_url).map_err(|e| Error::invalid_url(base_url, e))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(Error::invalid_url(base_url, "expected an http or https URL"));
    }

    let mut root = base.as_str().trim_end_matches('/').to_string();
    root.push('/');
    let prefix = prefix.trim_matches('/');
    if !prefix.is_empty() {
        root.push_str(prefix);
        root.push('/');
    }

    Url::parse(&root).map_err(|e| Error::invalid_url(base_url, e))
}

/// HTTP client bound to one storefront and one session
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: Url,
    session: Session,
}

impl ApiClient {
    /// Create a client with a fresh session
    pub fn new(target: &TargetConfig) -> Result<Self> {
        let api_root = api_root(&target.base_url, &target.api_prefix)?;
        let session = Session::new();

        let mut builder = reqwest::Client::builder()
            .cookie_provider(session.jar())
            .user_agent(concat!("storefront-check/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = target.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            api_root,
            session,
        })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Resolve an endpoint relative to the API root
    pub fn endpoint_url(&self, endpoint: &str) -> std::result::Result<Url, TransportError> {
        self.api_root
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| TransportError::Endpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    /// Send one request with the session attached
    ///
    /// `payload` is only sent for methods that carry a body.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = self.endpoint_url(endpoint)?;

        let mut request = self
            .http
            .request(method.as_reqwest(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        match payload {
            Some(body) if method.carries_body() => request = request.json(body),
            Some(_) => debug!(%method, %url, "payload ignored for method without body"),
            None => {}
        }

        debug!(%method, %url, "sending request");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(%method, %url, status, bytes = body.len(), "response received");

        Ok(RawResponse { status, body })
    }
}
