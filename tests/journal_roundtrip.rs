use chrono::{TimeZone, Utc};
use noble_journal::journal_entry::{Category, ImageRef, JournalEntry, Mood};
use noble_journal::journal_store::JournalStore;
use noble_journal::kv_store::{FileStore, KeyValueStore, MemoryStore, JOURNAL_KEY};
use std::collections::HashSet;
use std::sync::Arc;

fn sample(title: &str, day: u32) -> JournalEntry {
    let mut entry = JournalEntry::new(
        title,
        format!("{title} notes"),
        Utc.with_ymd_and_hms(2024, 4, day, 10, 0, 0).unwrap(),
    );
    entry.category = Category::Memories;
    entry.mood = Some(Mood::Calm);
    entry.add_tag("#family");
    entry
}

#[tokio::test]
async fn saved_entry_reloads_with_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));

    let mut original = sample("Picnic", 3);
    let mut image = ImageRef::new("file:///photos/picnic.jpg");
    image.metadata.insert("type".into(), "image/jpeg".into());
    original.image = Some(image);

    let mut store = JournalStore::new(storage.clone());
    store.load().await;
    let id = store.save(original.clone(), None).await.unwrap()[0].id.clone();
    assert!(!id.is_empty());

    let mut reopened = JournalStore::new(storage);
    let entries = reopened.load().await;
    assert_eq!(entries.len(), 1);
    let mut expected = original;
    expected.id = id;
    assert_eq!(entries[0], expected);
}

#[tokio::test]
async fn sequential_creates_get_distinct_ids() {
    let mut store = JournalStore::new(MemoryStore::new());
    for day in 1..=20 {
        store.save(sample("day", day), None).await.unwrap();
    }
    let ids: HashSet<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn edit_keeps_id_and_position() {
    let storage = Arc::new(MemoryStore::new());
    let mut store = JournalStore::new(storage.clone());
    store.save(sample("a", 1), None).await.unwrap();
    store.save(sample("b", 2), None).await.unwrap();
    store.save(sample("c", 3), None).await.unwrap();
    let before: Vec<String> = store.entries().iter().map(|e| e.id.clone()).collect();

    let target = store.entries()[1].clone();
    let mut edited = target.clone();
    edited.title = "b, revised".into();
    edited.mood = Some(Mood::Celebrating);
    edited.id = String::new();
    store.save(edited, Some(&target.id)).await.unwrap();

    let mut reloaded = JournalStore::new(storage);
    let entries = reloaded.load().await;
    let after: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
    assert_eq!(after, before);
    assert_eq!(entries[1].title, "b, revised");
    assert_eq!(entries[1].mood, Some(Mood::Celebrating));
    assert_eq!(entries[0].title, "c");
    assert_eq!(entries[2].title, "a");
}

#[tokio::test]
async fn deleting_missing_id_is_a_no_op() {
    let storage = Arc::new(MemoryStore::new());
    let mut store = JournalStore::new(storage.clone());
    store.save(sample("keep", 1), None).await.unwrap();
    let snapshot = storage.get(JOURNAL_KEY).await.unwrap();

    let entries = store.delete("no-such-id").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(storage.get(JOURNAL_KEY).await.unwrap(), snapshot);

    let id = store.entries()[0].id.clone();
    assert!(store.delete(&id).await.unwrap().is_empty());
    assert_eq!(storage.get(JOURNAL_KEY).await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn new_entries_are_prepended() {
    let mut store = JournalStore::new(MemoryStore::new());
    store.save(sample("newer date", 20), None).await.unwrap();
    let entries = store.save(sample("older date", 1), None).await.unwrap();
    assert_eq!(entries[0].title, "older date");

    // load re-sorts by date
    let entries = store.load().await;
    assert_eq!(entries[0].title, "newer date");
}
