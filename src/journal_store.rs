use crate::error::StoreError;
use crate::journal_entry::JournalEntry;
use crate::kv_store::{KeyValueStore, JOURNAL_KEY};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// In-memory owner of the journal collection, persisted whole under
/// [`JOURNAL_KEY`].
///
/// Every mutation writes the complete collection back in one `set`. The
/// in-memory list is replaced only after that write succeeds.
pub struct JournalStore<S> {
    storage: S,
    entries: Vec<JournalEntry>,
}

impl<S: KeyValueStore> JournalStore<S> {
    pub fn new(storage: S) -> Self {
        JournalStore {
            storage,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&JournalEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Reads the persisted collection, newest first. Never fails: an
    /// unreadable value is treated as an empty journal, and single records
    /// that do not decode are skipped.
    pub async fn load(&mut self) -> &[JournalEntry] {
        let mut entries = match self.storage.get(JOURNAL_KEY).await {
            Ok(Some(raw)) => decode_entries(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read journal");
                Vec::new()
            }
        };
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        debug!(count = entries.len(), "journal loaded");
        self.entries = entries;
        &self.entries
    }

    /// Replaces the entry with `editing_id` in place, or prepends `entry`
    /// under a fresh id when there is nothing to replace.
    pub async fn save(
        &mut self,
        mut entry: JournalEntry,
        editing_id: Option<&str>,
    ) -> Result<&[JournalEntry], StoreError> {
        let mut next = self.entries.clone();
        let position = editing_id.and_then(|id| next.iter().position(|e| e.id == id));

        match position {
            Some(index) => {
                entry.id = next[index].id.clone();
                next[index] = entry;
            }
            None => {
                entry.id = Uuid::new_v4().to_string();
                next.insert(0, entry);
            }
        }

        self.commit(next).await?;
        match position {
            Some(index) => info!(id = %self.entries[index].id, "journal entry updated"),
            None => info!(id = %self.entries[0].id, "journal entry created"),
        }
        Ok(&self.entries)
    }

    /// Removing an id that is not present still rewrites the collection and
    /// is not an error.
    pub async fn delete(&mut self, id: &str) -> Result<&[JournalEntry], StoreError> {
        let next: Vec<JournalEntry> = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        let removed = next.len() != self.entries.len();
        self.commit(next).await?;
        info!(id, removed, "journal entry deleted");
        Ok(&self.entries)
    }

    async fn commit(&mut self, next: Vec<JournalEntry>) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&next).map_err(|source| StoreError::Encode {
            key: JOURNAL_KEY,
            source,
        })?;
        if let Err(source) = self.storage.set(JOURNAL_KEY, &serialized).await {
            warn!(error = %source, "failed to write journal");
            return Err(StoreError::Write {
                key: JOURNAL_KEY,
                source,
            });
        }
        self.entries = next;
        Ok(())
    }
}

fn decode_entries(raw: &str) -> Vec<JournalEntry> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "journal data is unreadable, starting empty");
            return Vec::new();
        }
    };
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable journal entry");
                None
            }
        })
        .collect()
}
