//! History survives a restart when backed by the file store.

use parley_core::history::{HistoryManager, HistoryRepository};
use parley_infrastructure::{
    FileKeyValueStore, HISTORY_KEY, KeyValueHistoryRepository, KeyValueStore, ParleyPaths,
};
use std::sync::Arc;
use tempfile::TempDir;

fn repository(paths: &ParleyPaths) -> Arc<KeyValueHistoryRepository<FileKeyValueStore>> {
    Arc::new(KeyValueHistoryRepository::new(FileKeyValueStore::new(
        paths.storage_dir(),
    )))
}

#[tokio::test]
async fn test_history_round_trips_through_files() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ParleyPaths::with_base(temp_dir.path());

    {
        let mut history = HistoryManager::load(repository(&paths), 20, 50).await;
        history.add("first").await;
        history.add("second").await;
    }

    let restored = HistoryManager::load(repository(&paths), 20, 50).await;
    let messages: Vec<String> = restored.all().into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["second", "first"]);

    let raw = std::fs::read_to_string(
        FileKeyValueStore::new(paths.storage_dir()).file_for(HISTORY_KEY),
    )
    .unwrap();
    assert!(raw.contains("\"version\":\"1.0.0\""));
}

#[tokio::test]
async fn test_clear_then_restart_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ParleyPaths::with_base(temp_dir.path());

    let mut history = HistoryManager::load(repository(&paths), 20, 50).await;
    history.add("to be forgotten").await;
    history.clear().await;

    assert!(repository(&paths).load().await.is_empty());
}

#[tokio::test]
async fn test_twenty_one_adds_evict_oldest_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ParleyPaths::with_base(temp_dir.path());

    let mut history = HistoryManager::load(repository(&paths), 20, 50).await;
    for i in 1..=21 {
        history.add(&format!("message {}", i)).await;
    }

    let stored = repository(&paths).load().await;
    assert_eq!(stored.len(), 20);
    assert_eq!(stored[0].message, "message 21");
    assert!(stored.iter().all(|e| e.message != "message 1"));
}

#[tokio::test]
async fn test_legacy_array_is_migrated_on_next_save() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ParleyPaths::with_base(temp_dir.path());
    let store = FileKeyValueStore::new(paths.storage_dir());
    store
        .set(
            HISTORY_KEY,
            r#"[{"id":1000,"message":"from an old build","timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .await
        .unwrap();

    let mut history = HistoryManager::load(repository(&paths), 20, 50).await;
    assert_eq!(history.all()[0].preview, "from an old build");

    history.add("new").await;

    let raw = store.get(HISTORY_KEY).await.unwrap().unwrap();
    assert!(raw.starts_with("{\"version\":\"1.0.0\""));
    let stored = repository(&paths).load().await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].message, "from an old build");
    assert!(stored[0].id > stored[1].id);
}

#[tokio::test]
async fn test_unreadable_file_yields_empty_history() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ParleyPaths::with_base(temp_dir.path());
    let store = FileKeyValueStore::new(paths.storage_dir());
    std::fs::create_dir_all(paths.storage_dir()).unwrap();
    std::fs::write(store.file_for(HISTORY_KEY), "\u{0}\u{1}garbage").unwrap();

    let history = HistoryManager::load(repository(&paths), 20, 50).await;

    assert!(history.is_empty());
}
