// src/recommend.rs
//! Recommendation selector: ranks categories by derived weight and emits a
//! bounded list of representative article stubs. The stub source is a
//! pluggable seam; the bundled placeholder is meant to be replaced by a
//! live per-category fetch.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::types::{Article, CategoryCatalog};

/// Top-n categories, descending by weight with alphabetical tie-break.
/// An empty weight map is a valid steady state and yields an empty list.
pub fn select_top_categories(weights: &BTreeMap<String, f64>, n: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = weights.iter().map(|(k, &v)| (k, v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(k, _)| k.clone()).collect()
}

/// Supplier of representative articles for a set of categories.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn stubs_for(&self, categories: &[String]) -> Vec<Article>;
}

/// Synthetic "Top {category} Story" stand-ins. Catalogue copy is used for
/// known categories so the stubs read like the real pages.
pub struct PlaceholderArticles {
    catalog: CategoryCatalog,
    pub per_category: usize,
}

impl PlaceholderArticles {
    pub fn new(catalog: CategoryCatalog) -> Self {
        Self {
            catalog,
            per_category: 1,
        }
    }
}

impl Default for PlaceholderArticles {
    fn default() -> Self {
        Self::new(CategoryCatalog::default())
    }
}

#[async_trait]
impl ArticleSource for PlaceholderArticles {
    async fn stubs_for(&self, categories: &[String]) -> Vec<Article> {
        let mut out = Vec::with_capacity(categories.len() * self.per_category);
        for category in categories {
            let description = self
                .catalog
                .by_name(category)
                .map(|spec| spec.description.clone())
                .unwrap_or_else(|| {
                    format!("A representative {category} pick based on your recent reading.")
                });
            for i in 0..self.per_category {
                out.push(Article {
                    id: format!("{category}-top-{}", i + 1),
                    title: format!("Top {category} Story"),
                    description: description.clone(),
                    category: category.clone(),
                });
            }
        }
        out
    }
}

/// Convenience: rank, truncate, and materialize stubs in one call.
pub async fn recommendations(
    weights: &BTreeMap<String, f64>,
    n: usize,
    source: &dyn ArticleSource,
) -> Vec<Article> {
    let top = select_top_categories(weights, n);
    source.stubs_for(&top).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn orders_by_weight_then_alphabetically() {
        let w = weights(&[("Tech", 3.0), ("Sports", 3.0), ("Health", 1.0)]);
        assert_eq!(select_top_categories(&w, 2), vec!["Sports", "Tech"]);
        assert_eq!(
            select_top_categories(&w, 3),
            vec!["Sports", "Tech", "Health"]
        );
    }

    #[test]
    fn empty_weights_are_a_valid_steady_state() {
        let w = BTreeMap::new();
        assert!(select_top_categories(&w, 3).is_empty());
    }

    #[test]
    fn n_larger_than_map_returns_all() {
        let w = weights(&[("Tech", 1.0)]);
        assert_eq!(select_top_categories(&w, 10).len(), 1);
    }

    #[tokio::test]
    async fn placeholder_stubs_follow_the_selection() {
        let source = PlaceholderArticles::default();
        let stubs = source
            .stubs_for(&["Technology & Innovation".to_string(), "Gardening".to_string()])
            .await;
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].title, "Top Technology & Innovation Story");
        // Catalogue copy for known categories, generic copy otherwise.
        assert_eq!(
            stubs[0].description,
            "Latest in tech, innovation, and digital trends"
        );
        assert!(stubs[1].description.contains("Gardening"));
    }

    #[tokio::test]
    async fn empty_selection_yields_no_stubs() {
        let source = PlaceholderArticles::default();
        assert!(source.stubs_for(&[]).await.is_empty());
    }
}
