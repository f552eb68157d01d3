// src/lib.rs
// Public library surface for the NewsHub UI layers (and integration tests).

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod platform;
pub mod preference;
pub mod recommend;
pub mod refresh;
pub mod tracker;
pub mod types;

mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::cache::{FileKvStore, FreshnessCache, KvStore, MemoryKvStore};
pub use crate::client::NewsClient;
pub use crate::config::ClientConfig;
pub use crate::error::{FetchError, StorageError};
pub use crate::fetch::{EndpointResponse, FetchExecutor, FetchOptions, HttpEndpoint, NewsEndpoint};
pub use crate::platform::{PreferenceStore, SpeechPlayback};
pub use crate::preference::compute_weights;
pub use crate::recommend::{select_top_categories, ArticleSource, PlaceholderArticles};
pub use crate::refresh::RefreshHandle;
pub use crate::tracker::InteractionTracker;
pub use crate::types::{
    Article, CacheEntry, CategoryCatalog, CategorySpec, NewsItem, PreferenceState, ViewEvent,
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR NEWSHUB_ENV in {local, development, dev})
///   - NEWSHUB_DEV_LOG=1
pub fn init_dev_tracing() {
    let dev_flag = std::env::var("NEWSHUB_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("NEWSHUB_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newshub_core=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
