// src/client.rs
//! Read-side façade wiring the executor and the cache into the
//! stale-while-revalidate policy the category views rely on.

use std::sync::Arc;

use metrics::counter;

use crate::cache::FreshnessCache;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::fetch::{FetchExecutor, FetchOptions, NewsEndpoint};
use crate::refresh::{spawn_periodic_refresh, RefreshHandle};
use crate::types::{CategoryCatalog, NewsItem};

pub struct NewsClient {
    executor: FetchExecutor,
    cache: Arc<FreshnessCache>,
    config: ClientConfig,
}

impl NewsClient {
    pub fn new(
        endpoint: Arc<dyn NewsEndpoint>,
        cache: Arc<FreshnessCache>,
        config: ClientConfig,
    ) -> Self {
        let executor = FetchExecutor::new(endpoint, Arc::clone(&cache), FetchOptions::from(&config));
        Self {
            executor,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<FreshnessCache> {
        &self.cache
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Activation read path:
    /// - fresh cache entry → serve it, no network this activation;
    /// - stale entry → serve it immediately and revalidate in the background;
    /// - absent → fetch in the foreground (cold start).
    pub async fn get_news(self: &Arc<Self>, category: &str) -> Result<Vec<NewsItem>, FetchError> {
        if let Some(entry) = self.cache.get(category) {
            if self.cache.is_fresh(&entry, self.config.cache_max_age_ms) {
                return Ok(entry.payload);
            }
            counter!("news_cache_stale_served_total").increment(1);
            let this = Arc::clone(self);
            let cat = category.to_string();
            tokio::spawn(async move {
                if let Err(e) = this.refresh_category(&cat).await {
                    tracing::warn!(error = %e, category = %cat, "background revalidation failed");
                }
            });
            return Ok(entry.payload);
        }
        self.refresh_category(category).await
    }

    /// Boundary helper for views: never fails. Malformed payloads and
    /// exhausted retries come back as an empty list plus the message to
    /// show next to the retry affordance.
    pub async fn get_news_lenient(
        self: &Arc<Self>,
        category: &str,
    ) -> (Vec<NewsItem>, Option<&'static str>) {
        match self.get_news(category).await {
            Ok(items) => (items, None),
            Err(e) => {
                tracing::warn!(error = %e, category, "serving empty result to the view");
                (Vec::new(), Some(e.user_message()))
            }
        }
    }

    /// Slug page read path: fetch the slug's backing feed and keep only the
    /// items its keyword rules accept.
    pub async fn get_news_for_slug(
        self: &Arc<Self>,
        catalog: &CategoryCatalog,
        slug: &str,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let spec = catalog.by_slug(slug).ok_or_else(|| FetchError::Validation {
            target: slug.to_string(),
            reason: "unknown category slug".to_string(),
        })?;
        let items = self.get_news(&spec.title).await?;
        Ok(items.into_iter().filter(|it| spec.matches(it)).collect())
    }

    /// One forced fetch through the executor; validated success overwrites
    /// the cache wholesale.
    pub async fn refresh_category(&self, category: &str) -> Result<Vec<NewsItem>, FetchError> {
        self.executor.fetch_category(category).await
    }

    pub async fn get_item(&self, id: &str) -> Result<NewsItem, FetchError> {
        self.executor.fetch_item(id).await
    }

    /// Periodic refresh for one category, independent of freshness. The
    /// returned handle owns the task: drop it on view teardown and the
    /// ticking stops deterministically.
    #[must_use = "dropping the handle stops the refresh; hold it for the view's lifetime"]
    pub fn start_periodic_refresh(self: &Arc<Self>, category: &str) -> RefreshHandle {
        spawn_periodic_refresh(
            Arc::clone(self),
            category.to_string(),
            self.config.refresh_interval_ms,
        )
    }
}
