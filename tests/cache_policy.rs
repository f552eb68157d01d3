// tests/cache_policy.rs
//! Stale-while-revalidate read path and persistent-store behavior.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use newshub_core::{
    ClientConfig, EndpointResponse, FileKvStore, FreshnessCache, NewsClient, NewsEndpoint, NewsItem,
};

fn item(headline: &str) -> NewsItem {
    NewsItem {
        id: None,
        headline: headline.into(),
        summary: "s".into(),
        url: "u".into(),
        source: "Reuters".into(),
        timestamp_iso: "2025-01-01T00:00:00Z".into(),
        category: "Tech".into(),
        audio_ref: None,
    }
}

/// Always answers 200 with a fixed single-item feed; counts calls.
struct CountingEndpoint {
    body: String,
    calls: Mutex<u32>,
    fail: bool,
}

impl CountingEndpoint {
    fn ok(headline: &str) -> Arc<Self> {
        let body = format!(
            r#"[{{"headline":"{headline}","summary":"s","url":"u","source":"Reuters","timestamp":"2025-01-01T00:00:00Z","category":"Tech"}}]"#
        );
        Arc::new(Self {
            body,
            calls: Mutex::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            body: String::new(),
            calls: Mutex::new(0),
            fail: true,
        })
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl NewsEndpoint for CountingEndpoint {
    async fn get_category(
        &self,
        _category: &str,
        _timeout: Duration,
    ) -> anyhow::Result<EndpointResponse> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(anyhow::anyhow!("connection refused"));
        }
        Ok(EndpointResponse {
            status: 200,
            body: self.body.clone(),
        })
    }

    async fn get_item(&self, _id: &str, _timeout: Duration) -> anyhow::Result<EndpointResponse> {
        self.get_category("_", _timeout).await
    }
}

fn fast_config() -> ClientConfig {
    ClientConfig {
        retry_delay_ms: 1,
        ..ClientConfig::default()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::test]
async fn fresh_entry_serves_without_a_network_call() {
    let endpoint = CountingEndpoint::ok("net");
    let cache = Arc::new(FreshnessCache::in_memory());
    cache.put("Tech", vec![item("cached")]);

    let client = Arc::new(NewsClient::new(endpoint.clone(), cache, fast_config()));
    let items = client.get_news("Tech").await.unwrap();
    assert_eq!(items[0].headline, "cached");
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn stale_entry_is_served_immediately_then_revalidated() {
    let endpoint = CountingEndpoint::ok("net");
    let cache = Arc::new(FreshnessCache::in_memory());
    cache.put_with_timestamp("Tech", vec![item("stale")], now_ms() - 60_000);

    let client = Arc::new(NewsClient::new(
        endpoint.clone(),
        Arc::clone(&cache),
        fast_config(),
    ));
    let items = client.get_news("Tech").await.unwrap();
    // The stale payload comes back right away.
    assert_eq!(items[0].headline, "stale");

    // The background revalidation overwrites the entry shortly after.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let entry = cache.get("Tech").unwrap();
        if entry.payload[0].headline == "net" {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "revalidation never landed"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(endpoint.calls(), 1);
}

#[tokio::test]
async fn cold_start_fetches_in_the_foreground() {
    let endpoint = CountingEndpoint::ok("net");
    let cache = Arc::new(FreshnessCache::in_memory());
    let client = Arc::new(NewsClient::new(
        endpoint.clone(),
        Arc::clone(&cache),
        fast_config(),
    ));

    let items = client.get_news("Tech").await.unwrap();
    assert_eq!(items[0].headline, "net");
    assert_eq!(endpoint.calls(), 1);
    assert!(cache.get("Tech").is_some());
}

#[tokio::test]
async fn lenient_read_degrades_to_empty_plus_message() {
    let endpoint = CountingEndpoint::failing();
    let cache = Arc::new(FreshnessCache::in_memory());
    let client = Arc::new(NewsClient::new(endpoint, cache, fast_config()));

    let (items, message) = client.get_news_lenient("Tech").await;
    assert!(items.is_empty());
    assert_eq!(message, Some("Unable to load news. Please try again."));
}

#[tokio::test]
async fn slug_read_path_filters_by_keyword_rules() {
    let endpoint = CountingEndpoint::ok("net"); // items carry category "Tech"
    let cache = Arc::new(FreshnessCache::in_memory());
    let client = Arc::new(NewsClient::new(endpoint, cache, fast_config()));
    let catalog = newshub_core::CategoryCatalog::default();

    let items = client
        .get_news_for_slug(&catalog, "technology-innovation")
        .await
        .unwrap();
    assert_eq!(items.len(), 1);

    let none = client
        .get_news_for_slug(&catalog, "business-finance")
        .await
        .unwrap();
    assert!(none.is_empty());

    assert!(client.get_news_for_slug(&catalog, "no-such-slug").await.is_err());
}

#[test]
fn file_store_round_trips_across_cache_instances() {
    let dir = std::env::temp_dir().join(format!("newshub-cache-{}", rand::random::<u64>()));

    let writer = FreshnessCache::with_store(Box::new(FileKvStore::new(&dir)));
    writer.put("World / Politics", vec![item("persisted")]);
    assert!(!writer.is_degraded());

    // A second instance over the same directory reads the value through.
    let reader = FreshnessCache::with_store(Box::new(FileKvStore::new(&dir)));
    let entry = reader.get("World / Politics").unwrap();
    assert_eq!(entry.payload[0].headline, "persisted");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_store_absence_is_a_clean_cold_start() {
    let dir = std::env::temp_dir().join(format!("newshub-cache-{}", rand::random::<u64>()));
    let cache = FreshnessCache::with_store(Box::new(FileKvStore::new(&dir)));
    assert!(cache.get("Tech").is_none());
    assert!(!cache.is_degraded());
}
