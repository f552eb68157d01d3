// src/platform.rs
//! Capability traits for external collaborators: the document store that
//! persists derived preferences, and platform speech playback. The core
//! never talks to these directly except where a caller asks it to.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::PreferenceState;

/// Document-store collaborator, keyed by the identity provider's user id.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn save_preferences(&self, user_id: &str, state: &PreferenceState) -> Result<()>;
    async fn load_preferences(&self, user_id: &str) -> Result<Option<PreferenceState>>;
}

/// Platform speech capability. Playback state lives entirely on the
/// platform side; the core only hands over text.
pub trait SpeechPlayback: Send {
    fn play(&mut self, text: &str);
    fn pause(&mut self);
    fn on_end(&mut self, callback: Box<dyn FnOnce() + Send>);
}

// --- Test helper ---
pub struct MockPreferenceStore {
    pub saved: std::sync::Mutex<Vec<(String, PreferenceState)>>,
}

impl MockPreferenceStore {
    pub fn new() -> Self {
        Self {
            saved: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for MockPreferenceStore {
    async fn save_preferences(&self, user_id: &str, state: &PreferenceState) -> Result<()> {
        self.saved
            .lock()
            .expect("mock store mutex poisoned")
            .push((user_id.to_string(), state.clone()));
        Ok(())
    }

    async fn load_preferences(&self, user_id: &str) -> Result<Option<PreferenceState>> {
        Ok(self
            .saved
            .lock()
            .expect("mock store mutex poisoned")
            .iter()
            .rev()
            .find(|(u, _)| u == user_id)
            .map(|(_, s)| s.clone()))
    }
}
