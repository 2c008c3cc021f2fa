//! Per-book persistence of the highlight set.

use sha1::{Digest, Sha1};

use crate::error::StoreError;
use crate::models::Highlight;
use crate::state::KeyValueStore;

const KEY_PREFIX: &str = "highlights:";

/// Stable store key for a book source. Different sources never share a slot.
pub fn context_key(source: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    let hash = hasher.finalize();
    format!("{}{}", KEY_PREFIX, &hex::encode(hash)[..16])
}

pub struct HighlightStore<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> HighlightStore<S> {
    pub fn new(store: S, source: &str) -> Self {
        Self {
            store,
            key: context_key(source),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persisted highlights, or an empty set when nothing usable is stored.
    pub fn load(&self) -> Vec<Highlight> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("Could not read highlights for {}: {}", self.key, err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Highlight>>(&raw) {
            Ok(highlights) => highlights,
            Err(err) => {
                log::warn!("Ignoring malformed highlights for {}: {}", self.key, err);
                Vec::new()
            }
        }
    }

    /// Overwrites the whole persisted set.
    pub fn save(&mut self, highlights: &[Highlight]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(highlights)?;
        self.store.set(&self.key, &payload)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
