use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::{KeyValueStore, StorageResult};
use crate::language::Language;
use crate::models::MenuItem;

pub struct MenuCache {
    store: Arc<dyn KeyValueStore>,
}

impl MenuCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn key(language: Language) -> String {
        format!("menu_cache_{}", language.code())
    }

    pub fn get(&self, language: Language) -> Option<Vec<MenuItem>> {
        let raw = match self.store.get(&Self::key(language)) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No cached menu for {language}");
                return None;
            }
            Err(e) => {
                warn!("Failed to read cached menu for {language}: {e}");
                return None;
            }
        };

        match serde_json::from_str::<Vec<MenuItem>>(&raw) {
            Ok(items) => {
                debug!("Loaded {} cached menu items for {language}", items.len());
                Some(items)
            }
            Err(e) => {
                warn!("Cached menu for {language} is corrupt, ignoring: {e}");
                None
            }
        }
    }

    pub fn put(&self, language: Language, items: &[MenuItem]) -> StorageResult<()> {
        let encoded = serde_json::to_string(items)?;
        self.store.set(&Self::key(language), &encoded)
    }

    pub fn clear(&self) -> StorageResult<()> {
        for language in Language::ALL {
            self.store.remove(&Self::key(language))?;
        }
        Ok(())
    }
}
