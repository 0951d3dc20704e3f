//! HTTP transport collaborator.
//!
//! The client core never talks to the network directly: it goes through
//! the [`HttpClient`] trait, so apps can substitute their own transport
//! (or a recording fake in tests). [`ReqwestClient`] is the default
//! implementation. Timeouts live here, not in the core; the core never
//! retries.

use crate::cache::Cache;
use crate::error::Error;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Transport contract for API root retrieval and form submission.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and return the raw body.
    ///
    /// Implementations must surface distinguishable status classes:
    /// non-2xx responses as [`Error::Status`], connection-level failures
    /// as [`Error::Request`].
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<String, Error>;
}

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Helper function to map reqwest errors to the API error taxonomy
fn map_http_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Request(format!("request timeout: {}", error))
    } else if error.is_connect() {
        Error::Request(format!("connection error: {}", error))
    } else {
        Error::Request(format!("HTTP error: {}", error))
    }
}

/// Default transport built on `reqwest`.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Request(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<String, Error> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(map_http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(map_http_error)
    }
}

/// Translate an unexpected HTTP status into the taxonomy, distinguishing
/// auth failures by whether an access token was supplied.
pub(crate) fn classify_status(error: Error, token_present: bool) -> Error {
    match error {
        Error::Status { status: 401, .. } | Error::Status { status: 403, .. } => {
            if token_present {
                Error::Auth("invalid access token".to_string())
            } else {
                Error::Auth("missing access token".to_string())
            }
        }
        other => other,
    }
}

/// Opaque get-or-fetch: cache lookup, then transport, then cache store.
pub(crate) async fn fetch_cached(
    client: &dyn HttpClient,
    cache: &dyn Cache,
    url: &str,
    ttl: Duration,
) -> Result<String, Error> {
    if let Some(body) = cache.get(url) {
        debug!(url, "cache hit");
        return Ok(body);
    }
    debug!(url, "cache miss, fetching");

    let headers = vec![("Accept".to_string(), "application/json".to_string())];
    let body = client.fetch(url, &headers).await?;
    cache.set(url, body.clone(), ttl);
    Ok(body)
}
