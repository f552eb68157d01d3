// src/types.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One news story as served by the remote API (`GET /news/{category}`).
/// Immutable once received. Wire names follow the API: `timestamp`,
/// `audio_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Server-issued id when the endpoint provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    /// Publication time, ISO 8601.
    #[serde(rename = "timestamp")]
    pub timestamp_iso: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "audio_url", default, skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
}

impl NewsItem {
    /// Stable identity: the server id when present, otherwise the
    /// (headline, source, timestamp) triple.
    pub fn identity_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => format!("{}|{}|{}", self.headline, self.source, self.timestamp_iso),
        }
    }
}

/// Whole-category cache payload. Overwritten wholesale on refresh, never
/// merged. Serde names match the persisted storage format
/// (`{"data": [...], "timestamp": ms}` under key `news-{category}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "data")]
    pub payload: Vec<NewsItem>,
    #[serde(rename = "timestamp")]
    pub fetched_at_epoch_ms: i64,
}

/// One reading observation. Append-only; repeated calls for the same article
/// as scroll progresses each append a fresh event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub article_id: String,
    pub category: String,
    pub title: String,
    /// Scroll completion in percent, clamped to [0, 100].
    pub completion_pct: f64,
    pub occurred_at_epoch_ms: i64,
}

/// Derived per-category weights. A materialized view over the retained
/// event history; always recomputable, never independently mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceState {
    pub category_weights: BTreeMap<String, f64>,
}

/// Recommendation stub shown in the "Your Top Picks" grid until the seam is
/// wired to a live per-category fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
}

/// Display config for one category page: routing slug, copy, and the keyword
/// rules that sort feed items into the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Case-insensitive substrings matched against `NewsItem::category`.
    /// Empty means "match everything" (the headline firehose).
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategorySpec {
    pub fn matches(&self, item: &NewsItem) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let cat = item.category.to_ascii_lowercase();
        self.keywords.iter().any(|k| cat.contains(k.as_str()))
    }
}

/// The static category catalogue shared by navigation, filtering, and the
/// recommendation stubs.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<CategorySpec>,
}

impl CategoryCatalog {
    pub fn new(entries: Vec<CategorySpec>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CategorySpec] {
        &self.entries
    }

    pub fn by_slug(&self, slug: &str) -> Option<&CategorySpec> {
        self.entries.iter().find(|e| e.slug == slug)
    }

    /// Find the spec whose slug or title equals `name` (case-insensitive).
    pub fn by_name(&self, name: &str) -> Option<&CategorySpec> {
        self.entries
            .iter()
            .find(|e| e.slug.eq_ignore_ascii_case(name) || e.title.eq_ignore_ascii_case(name))
    }

    /// Keep only the items the slug's keyword rules accept.
    pub fn filter_items(&self, slug: &str, items: &[NewsItem]) -> Vec<NewsItem> {
        match self.by_slug(slug) {
            Some(spec) => items.iter().filter(|it| spec.matches(it)).cloned().collect(),
            None => Vec::new(),
        }
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        let spec = |slug: &str, title: &str, description: &str, keywords: &[&str]| CategorySpec {
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        Self::new(vec![
            spec(
                "latest-headlines",
                "Latest Headlines",
                "Breaking news and top stories from around the world",
                &[],
            ),
            spec(
                "politics-global-affairs",
                "Politics & Global Affairs",
                "Political developments and international relations",
                &["politics", "world"],
            ),
            spec(
                "business-finance",
                "Business & Finance",
                "Financial markets, business news, and economic trends",
                &["business", "finance"],
            ),
            spec(
                "technology-innovation",
                "Technology & Innovation",
                "Latest in tech, innovation, and digital trends",
                &["tech", "science"],
            ),
            spec(
                "entertainment-lifestyle",
                "Entertainment & Lifestyle",
                "Entertainment, culture, and lifestyle news",
                &["entertainment", "lifestyle"],
            ),
        ])
    }
}
