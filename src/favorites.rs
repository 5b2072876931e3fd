use crate::kv_store::{KeyValueStore, FAVORITES_KEY};
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Article {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
}

pub static ARTICLES: [Article; 10] = [
    Article { id: "hatshepsut", title: "Hatshepsut", subtitle: "(c. 1507–1458 BCE)" },
    Article { id: "nefertiti", title: "Nefertiti", subtitle: "(c. 1370–1330 BCE)" },
    Article { id: "cleopatra", title: "Cleopatra VII", subtitle: "(69–30 BCE)" },
    Article { id: "nefertari", title: "Nefertari", subtitle: "(c. 1290–1255 BCE)" },
    Article { id: "ahhotep", title: "Ahhotep I", subtitle: "(c. 1560–1530 BCE)" },
    Article { id: "sobekneferu", title: "Sobekneferu", subtitle: "(c. 1806–1802 BCE)" },
    Article { id: "ankhesenamun", title: "Ankhesenamun", subtitle: "(c. 1348–1322 BCE)" },
    Article { id: "tiye", title: "Tiye", subtitle: "(c. 1398–1338 BCE)" },
    Article { id: "merneith", title: "Merneith", subtitle: "(c. 3000 BCE)" },
    Article { id: "twosret", title: "Twosret", subtitle: "(c. 1191–1189 BCE)" },
];

/// Bookmarked article ids, persisted as a JSON array of strings.
///
/// Both reads and writes fail silently; a lost bookmark is only logged.
pub struct FavoritesStore<S> {
    storage: S,
    ids: BTreeSet<String>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        FavoritesStore {
            storage,
            ids: BTreeSet::new(),
        }
    }

    pub async fn load(&mut self) {
        self.ids = match self.storage.get(FAVORITES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "favorites are unreadable");
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!(error = %e, "failed to read favorites");
                BTreeSet::new()
            }
        };
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flips the bookmark and returns the new state.
    pub async fn toggle(&mut self, id: &str) -> bool {
        let now_favorite = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        debug!(id, now_favorite, "favorite toggled");

        match serde_json::to_string(&self.ids) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(FAVORITES_KEY, &raw).await {
                    warn!(error = %e, "failed to persist favorites");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode favorites"),
        }
        now_favorite
    }

    /// Bookmarked articles in catalog order.
    pub fn saved(&self) -> Vec<&'static Article> {
        ARTICLES.iter().filter(|a| self.is_favorite(a.id)).collect()
    }

    /// Forgets the in-memory set. Used after the persisted key was cleared.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
