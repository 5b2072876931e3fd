use crate::error::StoreError;
use crate::kv_store::{KeyValueStore, ALL_KEYS, SETTINGS_KEY};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

fn default_true() -> bool {
    true
}

/// Stored values are merged over the defaults: a key missing from storage
/// keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub music: bool,
    #[serde(default = "default_true")]
    pub sounds: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            music: true,
            sounds: true,
            vibration: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Music,
    Sounds,
    Vibration,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [SettingKey::Music, SettingKey::Sounds, SettingKey::Vibration];

    pub fn label(self) -> &'static str {
        match self {
            SettingKey::Music => "Music",
            SettingKey::Sounds => "Sounds",
            SettingKey::Vibration => "Vibration",
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::Music => self.music,
            SettingKey::Sounds => self.sounds,
            SettingKey::Vibration => self.vibration,
        }
    }

    fn slot(&mut self, key: SettingKey) -> &mut bool {
        match key {
            SettingKey::Music => &mut self.music,
            SettingKey::Sounds => &mut self.sounds,
            SettingKey::Vibration => &mut self.vibration,
        }
    }
}

pub struct SettingsStore<S> {
    storage: S,
    settings: Settings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        SettingsStore {
            storage,
            settings: Settings::default(),
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub async fn load(&mut self) -> Settings {
        self.settings = match self.storage.get(SETTINGS_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "settings are unreadable, using defaults");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "failed to read settings");
                Settings::default()
            }
        };
        self.settings
    }

    /// Flips one toggle. A failed write is logged; the toggle stays flipped
    /// for this session.
    pub async fn toggle(&mut self, key: SettingKey) -> Settings {
        let slot = self.settings.slot(key);
        *slot = !*slot;
        info!(setting = key.label(), value = *slot, "setting toggled");

        match serde_json::to_string(&self.settings) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(SETTINGS_KEY, &raw).await {
                    warn!(error = %e, "failed to persist settings");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode settings"),
        }
        self.settings
    }

    /// Removes every key the app owns, all at once, then restores default
    /// settings in memory. The first failure is returned; the other removals
    /// still run.
    pub async fn reset_all_data(&mut self) -> Result<(), StoreError> {
        let storage = &self.storage;
        let results = join_all(ALL_KEYS.into_iter().map(|key| async move {
            storage.remove(key).await.map_err(|source| StoreError::Write { key, source })
        }))
        .await;

        self.settings = Settings::default();
        let failed = results.into_iter().find_map(Result::err);
        match failed {
            Some(e) => {
                warn!(error = %e, "reset did not clear all data");
                Err(e)
            }
            None => {
                info!(keys = ALL_KEYS.len(), "all app data reset");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::{MemoryStore, FAVORITES_KEY, JOURNAL_KEY};
    use std::sync::Arc;

    #[tokio::test]
    async fn partial_stored_settings_merge_over_defaults() {
        let storage = MemoryStore::new();
        storage.set(SETTINGS_KEY, r#"{"music":false}"#).await.unwrap();
        let mut store = SettingsStore::new(storage);
        let settings = store.load().await;
        assert!(!settings.music);
        assert!(settings.sounds);
        assert!(settings.vibration);
    }

    #[tokio::test]
    async fn toggle_round_trips() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = SettingsStore::new(storage.clone());
        store.load().await;
        assert!(!store.toggle(SettingKey::Vibration).await.vibration);

        let mut reloaded = SettingsStore::new(storage);
        let settings = reloaded.load().await;
        assert!(!settings.get(SettingKey::Vibration));
        assert!(settings.get(SettingKey::Music));
    }

    #[tokio::test]
    async fn reset_clears_every_key() {
        let storage = Arc::new(MemoryStore::new());
        for key in ALL_KEYS {
            storage.set(key, "[]").await.unwrap();
        }
        let mut store = SettingsStore::new(storage.clone());
        store.toggle(SettingKey::Music).await;

        store.reset_all_data().await.unwrap();
        assert_eq!(store.settings(), Settings::default());
        assert_eq!(storage.get(JOURNAL_KEY).await.unwrap(), None);
        assert_eq!(storage.get(FAVORITES_KEY).await.unwrap(), None);
        assert_eq!(storage.get(SETTINGS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_reports_failure() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_fail_writes(true);
        let mut store = SettingsStore::new(storage);
        assert!(store.reset_all_data().await.is_err());
    }
}
