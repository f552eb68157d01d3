// src/preference.rs
//! Preference model: folds the view-event history into per-category
//! weights. Pure, deterministic, and free of I/O, so the state is always
//! recomputable from the retained window — evicted events correctly stop
//! counting.

use std::collections::BTreeMap;

use crate::types::ViewEvent;

/// Per-event contribution. Floors at 1% so a bare article open still
/// registers; monotone in completion.
pub fn contribution(completion_pct: f64) -> f64 {
    completion_pct.max(1.0) / 100.0
}

/// Sum contributions per category. The `BTreeMap` keeps iteration order
/// alphabetical, which doubles as the deterministic tie-break order for
/// consumers that need one.
pub fn compute_weights(history: &[ViewEvent]) -> BTreeMap<String, f64> {
    let mut weights: BTreeMap<String, f64> = BTreeMap::new();
    for ev in history {
        *weights.entry(ev.category.clone()).or_insert(0.0) += contribution(ev.completion_pct);
    }
    weights
}
