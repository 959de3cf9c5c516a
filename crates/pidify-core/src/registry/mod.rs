//! Registry clients and the HTTP transport they share.
//!
//! Every client issues a single GET per lookup. Failures are returned as
//! [`RegistryError`] to the resolver functions, which log them and report the
//! lookup as unresolved.

pub mod crossref;
pub mod funders;
pub mod mock;
pub mod openalex;
pub mod orcid;
pub mod ror;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::Config;

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 500;

/// Status and body of a registry response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("rate limited (429)")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Parse(String),
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, RegistryError>> + Send + 'a>>;

/// Issues GET requests to registries.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a>;
}

/// [`Transport`] backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent_header())
            .build()
            .map_err(|e| RegistryError::Http(e.to_string()))?;
        Ok(Self {
            client,
            timeout: config.http_timeout(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        Box::pin(async move {
            let resp = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| RegistryError::Http(e.to_string()))?;
            read_response(resp).await
        })
    }
}

async fn read_response(resp: reqwest::Response) -> Result<HttpResponse, RegistryError> {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| RegistryError::Http(e.to_string()))?;
    Ok(HttpResponse { status, body })
}

/// GET `url` and return the body of a successful response.
pub async fn fetch_text(transport: &dyn Transport, url: &str) -> Result<String, RegistryError> {
    tracing::debug!(url, "registry request");
    let resp = transport.get(url).await?;
    match resp.status {
        200..=299 => Ok(resp.body),
        429 => Err(RegistryError::RateLimited),
        status => Err(RegistryError::Status {
            status,
            body: excerpt(&resp.body),
        }),
    }
}

/// GET `url` and parse the body as JSON.
pub async fn fetch_json(
    transport: &dyn Transport,
    url: &str,
) -> Result<serde_json::Value, RegistryError> {
    let body = fetch_text(transport, url).await?;
    serde_json::from_str(&body).map_err(|e| RegistryError::Parse(e.to_string()))
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{cut}...")
    }
}
