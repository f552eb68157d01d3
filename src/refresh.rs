// src/refresh.rs
//! Periodic background refresh as an explicitly owned resource. The handle
//! aborts its task on drop, so a torn-down view can never leak repeating
//! work; cleanup never relies on garbage collection.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::client::NewsClient;
use crate::metrics::ensure_metrics_described;

/// Owned handle for one category's refresh loop.
#[derive(Debug)]
pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the loop now instead of at drop time.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a refresh loop for `category`. The first tick fires immediately,
/// then every `interval_ms`, regardless of cache freshness.
pub fn spawn_periodic_refresh(
    client: Arc<NewsClient>,
    category: String,
    interval_ms: u64,
) -> RefreshHandle {
    ensure_metrics_described();
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        loop {
            ticker.tick().await;
            counter!("news_refresh_ticks_total").increment(1);
            gauge!("news_refresh_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

            match client.refresh_category(&category).await {
                Ok(items) => {
                    tracing::debug!(category = %category, items = items.len(), "periodic refresh tick");
                }
                Err(e) => {
                    // The next tick self-heals; the cache keeps serving the
                    // last good payload meanwhile.
                    tracing::warn!(error = %e, category = %category, "periodic refresh failed");
                }
            }
        }
    });
    RefreshHandle { handle }
}
