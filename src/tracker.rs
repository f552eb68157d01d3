// src/tracker.rs
//! Interaction tracker: session-scoped, capped, append-only log of reading
//! events. Purely local; the only outward path is an explicit preference
//! persistence call through the document-store collaborator.

use std::sync::Mutex;

use metrics::counter;

use crate::metrics::ensure_metrics_described;
use crate::platform::PreferenceStore;
use crate::preference::compute_weights;
use crate::types::{PreferenceState, ViewEvent};

pub const DEFAULT_HISTORY_CAP: usize = 500;

#[derive(Debug)]
pub struct InteractionTracker {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Debug)]
struct Inner {
    user_id: Option<String>,
    events: Vec<ViewEvent>,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAP)
    }

    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(Inner {
                user_id: None,
                events: Vec::new(),
            }),
            cap,
        }
    }

    /// Begin a new session scope, clearing any prior history. `None` tracks
    /// an anonymous session.
    pub fn start_session(&self, user_id: Option<&str>) {
        let mut inner = self.inner.lock().expect("tracker mutex poisoned");
        inner.user_id = user_id.map(str::to_string);
        inner.events.clear();
    }

    pub fn user_id(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("tracker mutex poisoned")
            .user_id
            .clone()
    }

    /// Append one view event. Safe to call repeatedly for the same article
    /// as scroll completion progresses; every call appends, preserving the
    /// full engagement trail. Malformed input is ignored rather than
    /// breaking navigation: empty ids/categories and non-finite completion
    /// values are dropped, finite values are clamped to [0, 100].
    pub fn track_article_view(
        &self,
        article_id: &str,
        category: &str,
        title: &str,
        completion_pct: f64,
    ) {
        ensure_metrics_described();
        if article_id.trim().is_empty() || category.trim().is_empty() {
            tracing::debug!("ignoring view event with empty id or category");
            return;
        }
        if !completion_pct.is_finite() {
            tracing::debug!(article_id, "ignoring view event with non-finite completion");
            return;
        }

        let event = ViewEvent {
            article_id: article_id.to_string(),
            category: category.to_string(),
            title: title.to_string(),
            completion_pct: completion_pct.clamp(0.0, 100.0),
            occurred_at_epoch_ms: now_ms(),
        };

        let mut inner = self.inner.lock().expect("tracker mutex poisoned");
        inner.events.push(event);
        if inner.events.len() > self.cap {
            let excess = inner.events.len() - self.cap;
            inner.events.drain(0..excess);
        }
        counter!("news_tracker_events_total").increment(1);
    }

    /// Snapshot of the retained history, most-recent-last. Not a live view.
    pub fn history(&self) -> Vec<ViewEvent> {
        self.inner.lock().expect("tracker mutex poisoned").events.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("tracker mutex poisoned").events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current derived weights over the retained window.
    pub fn preference_state(&self) -> PreferenceState {
        PreferenceState {
            category_weights: compute_weights(&self.history()),
        }
    }

    /// Push the derived preference summary to the document store, keyed by
    /// the session user (or "anonymous").
    pub async fn persist_preferences(&self, store: &dyn PreferenceStore) -> anyhow::Result<()> {
        let user = self.user_id().unwrap_or_else(|| "anonymous".to_string());
        let state = self.preference_state();
        store.save_preferences(&user, &state).await
    }
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
