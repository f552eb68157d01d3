// tests/fetch_retry.rs
//! Retry/timeout/validation discipline of the bounded fetch executor,
//! driven through a scripted endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use newshub_core::{
    EndpointResponse, FetchError, FetchExecutor, FetchOptions, FreshnessCache, NewsEndpoint,
};

const GOOD_BODY: &str = r#"[{"headline":"h","summary":"s","url":"u","source":"Reuters","timestamp":"2025-01-01T00:00:00Z"}]"#;
const GOOD_ITEM: &str = r#"{"headline":"h","summary":"s","url":"u","source":"Reuters","timestamp":"2025-01-01T00:00:00Z"}"#;

#[derive(Clone, Debug)]
enum Step {
    Ok(&'static str),
    Status(u16),
    TransportFail,
}

/// Pops one step per transport attempt; the last step repeats forever.
struct ScriptedEndpoint {
    steps: Mutex<Vec<Step>>,
    calls: Mutex<u32>,
}

impl ScriptedEndpoint {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }

    fn next(&self) -> anyhow::Result<EndpointResponse> {
        *self.calls.lock().unwrap() += 1;
        let mut steps = self.steps.lock().unwrap();
        let step = if steps.len() > 1 {
            steps.remove(0)
        } else {
            steps[0].clone()
        };
        match step {
            Step::Ok(body) => Ok(EndpointResponse {
                status: 200,
                body: body.to_string(),
            }),
            Step::Status(code) => Ok(EndpointResponse {
                status: code,
                body: String::new(),
            }),
            Step::TransportFail => Err(anyhow::anyhow!("connection refused")),
        }
    }
}

#[async_trait]
impl NewsEndpoint for ScriptedEndpoint {
    async fn get_category(
        &self,
        _category: &str,
        _timeout: Duration,
    ) -> anyhow::Result<EndpointResponse> {
        self.next()
    }

    async fn get_item(&self, _id: &str, _timeout: Duration) -> anyhow::Result<EndpointResponse> {
        self.next()
    }
}

fn fast_opts() -> FetchOptions {
    FetchOptions {
        timeout_ms: 1_000,
        max_retries: 3,
        retry_delay_ms: 1,
    }
}

fn executor(endpoint: &Arc<ScriptedEndpoint>) -> (FetchExecutor, Arc<FreshnessCache>) {
    let cache = Arc::new(FreshnessCache::in_memory());
    let exec = FetchExecutor::new(endpoint.clone(), Arc::clone(&cache), fast_opts());
    (exec, cache)
}

#[tokio::test]
async fn three_failures_then_success_returns_payload_once() {
    let endpoint = ScriptedEndpoint::new(vec![
        Step::TransportFail,
        Step::TransportFail,
        Step::TransportFail,
        Step::Ok(GOOD_BODY),
    ]);
    let (exec, cache) = executor(&endpoint);

    let items = exec.fetch_category("Tech").await.unwrap();
    assert_eq!(items.len(), 1);
    // 1 initial attempt + 3 retries, i.e. no more than 3 retry delays.
    assert_eq!(endpoint.calls(), 4);
    // Validated success wrote the cache.
    assert_eq!(cache.get("Tech").unwrap().payload, items);
}

#[tokio::test]
async fn unbounded_failures_surface_network_error_after_retries() {
    let endpoint = ScriptedEndpoint::new(vec![Step::TransportFail]);
    let (exec, cache) = executor(&endpoint);

    let err = exec.fetch_category("Tech").await.unwrap_err();
    assert!(matches!(err, FetchError::Network { attempts: 4, .. }));
    assert_eq!(endpoint.calls(), 4);
    assert_eq!(err.user_message(), "Unable to load news. Please try again.");
    assert!(cache.get("Tech").is_none());
}

#[tokio::test]
async fn non_2xx_responses_consume_retries_like_transport_failures() {
    let endpoint = ScriptedEndpoint::new(vec![
        Step::Status(500),
        Step::Status(503),
        Step::Ok(GOOD_BODY),
    ]);
    let (exec, _cache) = executor(&endpoint);

    assert!(exec.fetch_category("Tech").await.is_ok());
    assert_eq!(endpoint.calls(), 3);
}

#[tokio::test]
async fn final_non_2xx_is_a_network_error() {
    let endpoint = ScriptedEndpoint::new(vec![Step::Status(502)]);
    let (exec, _cache) = executor(&endpoint);

    let err = exec.fetch_category("Tech").await.unwrap_err();
    match err {
        FetchError::Network { reason, .. } => assert!(reason.contains("502")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_payload_leaves_prior_cache_entry_untouched() {
    let endpoint = ScriptedEndpoint::new(vec![
        Step::Ok(GOOD_BODY),
        Step::Ok(r#"{"not":"an array"}"#),
    ]);
    let (exec, cache) = executor(&endpoint);

    exec.fetch_category("Tech").await.unwrap();
    let before = cache.get("Tech").unwrap();

    let err = exec.fetch_category("Tech").await.unwrap_err();
    assert!(matches!(err, FetchError::Validation { .. }));

    let after = cache.get("Tech").unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn empty_category_is_rejected_without_touching_the_network() {
    let endpoint = ScriptedEndpoint::new(vec![Step::Ok(GOOD_BODY)]);
    let (exec, _cache) = executor(&endpoint);

    let err = exec.fetch_category("  ").await.unwrap_err();
    assert!(matches!(err, FetchError::Validation { .. }));
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn fetch_item_retries_but_never_caches() {
    let endpoint = ScriptedEndpoint::new(vec![Step::TransportFail, Step::Ok(GOOD_ITEM)]);
    let (exec, cache) = executor(&endpoint);

    let item = exec.fetch_item("7").await.unwrap();
    assert_eq!(item.headline, "h");
    assert_eq!(endpoint.calls(), 2);
    // Items are not category payloads; nothing lands in the cache.
    assert!(cache.get("7").is_none());
}

#[tokio::test]
async fn fetch_item_validates_the_object_shape() {
    let endpoint = ScriptedEndpoint::new(vec![Step::Ok("[1,2,3]")]);
    let (exec, _cache) = executor(&endpoint);

    let err = exec.fetch_item("7").await.unwrap_err();
    assert!(matches!(err, FetchError::Validation { .. }));
}
