//! HTTP search client implementation.

use std::time::Duration;

use async_trait::async_trait;
use quarry_core::{Error, Result};
use quarry_fts::{SearchClient, SearchRequest, SearchResult, wire};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::ClientConfig;

/// Search client that talks to a cluster's search service over HTTP.
///
/// Requests are posted to `{endpoint}/api/index/{index}/query`. The
/// underlying `reqwest::Client` pools connections; clone the client to share
/// the pool across tasks.
#[derive(Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    base: Url,
    config: ClientConfig,
}

impl HttpSearchClient {
    /// Create a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid or the HTTP
    /// client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = Url::parse(config.endpoint.trim())
            .map_err(|e| Error::config(format!("invalid endpoint '{}': {e}", config.endpoint)))?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "endpoint '{}' cannot carry a path",
                config.endpoint
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL that queries against `index` are posted to.
    pub fn query_url(&self, index: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "index", index, "query"]);
        Ok(url)
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResult> {
        let url = self.query_url(request.index_name())?;
        let body = wire::encode_request(request);
        log::debug!(
            "POST {url} query={} limit={}",
            request.query().kind(),
            request.limit()
        );

        let mut builder = self.http.post(url.clone()).json(&body);
        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::connection_with_source(format!("request to {url} failed"), e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            Error::connection_with_source(format!("reading response from {url} failed"), e)
        })?;

        if !status.is_success() {
            let err = classify_failure(status, request.index_name(), &text);
            log::debug!("Search on '{}' failed: {err}", request.index_name());
            return Err(err);
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| Error::decode(format!("response is not valid JSON: {e}")))?;
        SearchResult::decode(&value, request)
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl std::fmt::Debug for HttpSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchClient")
            .field("base", &self.base.as_str())
            .field("config", &self.config)
            .finish()
    }
}

/// Map a non-success response to the error kind the caller sees.
///
/// The search service answers a missing index with either 404 or a 400
/// whose body names the problem, so the body is checked as well.
fn classify_failure(status: StatusCode, index: &str, body: &str) -> Error {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::auth(message),
        StatusCode::NOT_FOUND => Error::index_not_found(index),
        _ if mentions_missing_index(&message) => Error::index_not_found(index),
        _ => Error::query_execution(format!("HTTP {}: {message}", status.as_u16())),
    }
}

/// Pull the `error` field out of a JSON error body, or fall back to the
/// raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn mentions_missing_index(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("index not found") || lower.contains("no such index")
}

// ============================================================================
// Tests
// ============================================================================
