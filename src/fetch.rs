// src/fetch.rs
//! Bounded fetch executor: one HTTP GET per attempt under a hard per-attempt
//! timeout, a fixed-interval retry loop, and strict payload validation.
//! Validated category payloads are written back to the freshness cache;
//! anything that fails validation is never cached.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use tokio::time::sleep;

use crate::cache::FreshnessCache;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::metrics::ensure_metrics_described;
use crate::types::NewsItem;

/// Raw transport outcome of a single attempt. Status classification is the
/// executor's job, not the endpoint's.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: String,
}

/// One call = one transport attempt. The executor owns timeout arming and
/// the retry budget; implementations just issue the GET.
#[async_trait]
pub trait NewsEndpoint: Send + Sync {
    async fn get_category(
        &self,
        category: &str,
        timeout: Duration,
    ) -> anyhow::Result<EndpointResponse>;

    async fn get_item(&self, id: &str, timeout: Duration) -> anyhow::Result<EndpointResponse>;
}

/// Production endpoint against the remote news API
/// (`GET {base}/news/{category}`, `GET {base}/news/item/{id}`).
pub struct HttpEndpoint {
    base_url: String,
    client: reqwest::Client,
}

impl HttpEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, url: String, timeout: Duration) -> anyhow::Result<EndpointResponse> {
        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(EndpointResponse { status, body })
    }
}

#[async_trait]
impl NewsEndpoint for HttpEndpoint {
    async fn get_category(
        &self,
        category: &str,
        timeout: Duration,
    ) -> anyhow::Result<EndpointResponse> {
        self.get(format!("{}/news/{}", self.base_url, category), timeout)
            .await
    }

    async fn get_item(&self, id: &str, timeout: Duration) -> anyhow::Result<EndpointResponse> {
        self.get(format!("{}/news/item/{}", self.base_url, id), timeout)
            .await
    }
}

/// Retry/timeout knobs. `max_retries` counts retries after the initial
/// attempt, so the transport is hit at most `1 + max_retries` times with at
/// most `max_retries` delays in between.
#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl From<&ClientConfig> for FetchOptions {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            timeout_ms: cfg.timeout_ms,
            max_retries: cfg.max_retries,
            retry_delay_ms: cfg.retry_delay_ms,
        }
    }
}

enum Target<'a> {
    Category(&'a str),
    Item(&'a str),
}

impl Target<'_> {
    fn name(&self) -> &str {
        match self {
            Target::Category(c) => c,
            Target::Item(i) => i,
        }
    }
}

pub struct FetchExecutor {
    endpoint: Arc<dyn NewsEndpoint>,
    cache: Arc<FreshnessCache>,
    opts: FetchOptions,
}

impl FetchExecutor {
    pub fn new(endpoint: Arc<dyn NewsEndpoint>, cache: Arc<FreshnessCache>, opts: FetchOptions) -> Self {
        Self {
            endpoint,
            cache,
            opts,
        }
    }

    /// Fetch, validate, and cache one category feed. The cache write is
    /// skipped entirely on validation failure, leaving any prior entry
    /// untouched.
    pub async fn fetch_category(&self, category: &str) -> Result<Vec<NewsItem>, FetchError> {
        if category.trim().is_empty() {
            return Err(FetchError::Validation {
                target: category.to_string(),
                reason: "category must be a non-empty string".to_string(),
            });
        }
        let body = self.get_with_retry(&Target::Category(category)).await?;
        let items = parse_category_items(category, &body)?;
        self.cache.put(category, items.clone());
        Ok(items)
    }

    /// Fetch a single story by id. Items are not cached: the cache holds
    /// wholesale category payloads only.
    pub async fn fetch_item(&self, id: &str) -> Result<NewsItem, FetchError> {
        if id.trim().is_empty() {
            return Err(FetchError::Validation {
                target: id.to_string(),
                reason: "item id must be a non-empty string".to_string(),
            });
        }
        let body = self.get_with_retry(&Target::Item(id)).await?;
        parse_single_item(id, &body)
    }

    /// The retry loop. A per-attempt timeout aborts only that attempt; the
    /// loop then spends one of its retries like any other failure. The
    /// delay runs only before a retry, never after the final failure.
    async fn get_with_retry(&self, target: &Target<'_>) -> Result<String, FetchError> {
        ensure_metrics_described();
        let timeout = Duration::from_millis(self.opts.timeout_ms);
        let mut retries_used = 0u32;
        loop {
            counter!("news_fetch_attempts_total").increment(1);
            let outcome = match target {
                Target::Category(c) => self.endpoint.get_category(c, timeout).await,
                Target::Item(i) => self.endpoint.get_item(i, timeout).await,
            };

            let reason = match outcome {
                Ok(resp) if (200..300).contains(&resp.status) => return Ok(resp.body),
                Ok(resp) => format!("status {}", resp.status),
                Err(e) => e.to_string(),
            };

            if retries_used < self.opts.max_retries {
                retries_used += 1;
                counter!("news_fetch_retries_total").increment(1);
                tracing::warn!(
                    target_name = target.name(),
                    retry = retries_used,
                    reason = %reason,
                    "attempt failed, retrying"
                );
                sleep(Duration::from_millis(self.opts.retry_delay_ms)).await;
                continue;
            }

            counter!("news_fetch_errors_total").increment(1);
            return Err(FetchError::Network {
                target: target.name().to_string(),
                attempts: retries_used + 1,
                reason,
            });
        }
    }
}

const REQUIRED_FIELDS: [&str; 5] = ["headline", "summary", "url", "source", "timestamp"];

fn validation(target: &str, reason: String) -> FetchError {
    FetchError::Validation {
        target: target.to_string(),
        reason,
    }
}

fn check_required_strings(target: &str, idx: usize, raw: &Value) -> Result<(), FetchError> {
    for field in REQUIRED_FIELDS {
        match raw.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(validation(target, format!("item {idx}: empty `{field}`")))
            }
            Some(_) => {
                return Err(validation(
                    target,
                    format!("item {idx}: `{field}` is not a string"),
                ))
            }
            None => {
                return Err(validation(
                    target,
                    format!("item {idx}: missing `{field}`"),
                ))
            }
        }
    }
    Ok(())
}

/// Body must be a JSON array of objects each carrying non-empty string
/// `headline`, `summary`, `url`, `source`, `timestamp`. A missing wire
/// category is filled with the requested one.
fn parse_category_items(category: &str, body: &str) -> Result<Vec<NewsItem>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| validation(category, format!("body is not JSON: {e}")))?;
    let arr = value
        .as_array()
        .ok_or_else(|| validation(category, "body is not a JSON array".to_string()))?;

    let mut items = Vec::with_capacity(arr.len());
    for (idx, raw) in arr.iter().enumerate() {
        check_required_strings(category, idx, raw)?;
        let mut item: NewsItem = serde_json::from_value(raw.clone())
            .map_err(|e| validation(category, format!("item {idx}: {e}")))?;
        if item.category.is_empty() {
            item.category = category.to_string();
        }
        items.push(item);
    }
    Ok(items)
}

fn parse_single_item(id: &str, body: &str) -> Result<NewsItem, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| validation(id, format!("body is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(validation(id, "body is not a JSON object".to_string()));
    }
    check_required_strings(id, 0, &value)?;
    serde_json::from_value(value).map_err(|e| validation(id, e.to_string()))
}
