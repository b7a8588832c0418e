//! Single-shot GET invoker against the Dao3 API.
//!
//! The invoker never returns an error: transport failures, non-2xx statuses and undecodable
//! bodies are all folded into [`ApiResult::Failure`].

use crate::envelope::ApiResult;
use crate::error::UpstreamError;
use crate::headers::AuthHeaders;
use crate::template::integral;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://code-api-pc.dao3.fun";

/// Outbound transport used by the [`Invoker`].
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Perform one GET and decode the 2xx body as JSON.
    async fn get_json(
        &self,
        url: Url,
        headers: Option<&AuthHeaders>,
    ) -> Result<Value, UpstreamError>;
}

/// `reqwest`-backed upstream. Cloning shares the connection pool.
#[derive(Clone, Debug, Default)]
pub struct HttpUpstream {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpUpstream {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per-request timeout. `None` keeps the client default (no timeout).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_json(
        &self,
        url: Url,
        headers: Option<&AuthHeaders>,
    ) -> Result<Value, UpstreamError> {
        let mut request = self.client.get(url);
        if let Some(headers) = headers {
            for (name, value) in headers.pairs() {
                request = request.header(name, value);
            }
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

#[derive(Clone)]
pub struct Invoker {
    base_url: String,
    upstream: Arc<dyn Upstream>,
}

impl Invoker {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, upstream: Arc<dyn Upstream>) -> Result<Self, url::ParseError> {
        Url::parse(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            upstream,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `base_url + endpoint` once and package the outcome.
    pub async fn invoke(&self, endpoint: &str, headers: Option<&AuthHeaders>) -> ApiResult {
        let outcome = match self.url_for(endpoint) {
            Ok(url) => self.upstream.get_json(url, headers).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(mut body) => {
                debug!(endpoint, "upstream request succeeded");
                normalize_numbers(&mut body);
                let body_text = serde_json::to_string(&body).unwrap_or_else(|_| body.to_string());
                ApiResult::Success { body_text }
            }
            Err(e) => {
                warn!(endpoint, error = %e, "upstream request failed");
                ApiResult::failure(endpoint, e.to_string())
            }
        }
    }

    fn url_for(&self, endpoint: &str) -> Result<Url, UpstreamError> {
        Url::parse(&format!("{}{endpoint}", self.base_url))
            .map_err(|e| UpstreamError::Transport(format!("Invalid URL: {e}")))
    }
}

/// Rewrite integral floats (`1.0`) as integers so re-encoded bodies read `1`.
fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(i) = n.as_f64().and_then(integral) {
                *value = Value::from(i);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
