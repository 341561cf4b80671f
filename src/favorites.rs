//! Favorites store
//!
//! This module keeps the user's favorite shows in memory and mirrors the
//! whole collection to persistent storage after every change.

use crate::catalog::{CatalogDetail, ShowId};
use crate::storage::{KeyValueStorage, StorageError};
use serde::{Deserialize, Serialize};

/// Storage key the collection is persisted under
pub const FAVORITES_KEY: &str = "favorites";

/// A favorited show
///
/// The entry is a snapshot taken when the show was favorited. It is never
/// refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: ShowId,
    pub name: String,
    #[serde(rename = "image", default)]
    pub image_url: Option<String>,
}

impl From<&CatalogDetail> for FavoriteEntry {
    fn from(detail: &CatalogDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name.clone(),
            image_url: detail
                .thumbnail_url
                .clone()
                .or_else(|| detail.poster_url.clone()),
        }
    }
}

/// Insertion-ordered set of favorites, unique by id
pub struct FavoritesStore<S> {
    storage: S,
    entries: Vec<FavoriteEntry>,
}

impl<S> FavoritesStore<S>
where
    S: KeyValueStorage,
{
    /// Loads the collection from `storage`
    ///
    /// A missing, unreadable or malformed payload results in an empty
    /// collection. Duplicate ids in the payload are collapsed, keeping the
    /// first occurrence.
    pub fn load(storage: S) -> Self {
        let entries = match storage.read(FAVORITES_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<FavoriteEntry>>(&payload) {
                Ok(entries) => dedup_by_id(entries),
                Err(e) => {
                    log::warn!("Ignoring malformed favorites payload: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read favorites: {}", e);
                Vec::new()
            }
        };

        log::debug!("Loaded {} favorite(s)", entries.len());

        Self { storage, entries }
    }

    /// Adds a snapshot of `detail` unless a favorite with the same id exists
    ///
    /// Returns whether the collection changed. The collection is persisted
    /// before returning; a persistence failure is reported but the in-memory
    /// change is kept.
    pub fn add(&mut self, detail: &CatalogDetail) -> Result<bool, StorageError> {
        if self.has(detail.id) {
            return Ok(false);
        }

        self.entries.push(FavoriteEntry::from(detail));
        self.persist()?;
        Ok(true)
    }

    /// Removes the favorite with `id`, if present
    ///
    /// Returns whether the collection changed.
    pub fn remove(&mut self, id: ShowId) -> Result<bool, StorageError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);

        if self.entries.len() == before {
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    /// Returns whether a show is a favorite
    pub fn has(&self, id: ShowId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Returns the favorites in insertion order
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.entries)?;
        self.storage.write(FAVORITES_KEY, &payload)
    }
}

fn dedup_by_id(entries: Vec<FavoriteEntry>) -> Vec<FavoriteEntry> {
    let mut unique: Vec<FavoriteEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !unique.iter().any(|existing| existing.id == entry.id) {
            unique.push(entry);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailingStorage, MemoryStorage};

    fn detail(id: ShowId, name: &str) -> CatalogDetail {
        CatalogDetail {
            id,
            name: name.to_string(),
            thumbnail_url: Some(format!("https://img/{}/medium.jpg", id)),
            poster_url: Some(format!("https://img/{}/original.jpg", id)),
            premiere_year: None,
            genres: Vec::new(),
            rating_average: None,
            network_name: None,
            summary_html: None,
            status: None,
            kind: None,
            language: None,
            runtime_minutes: None,
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);

        assert!(store.add(&detail(1, "Lost")).unwrap());
        let snapshot = store.entries().to_vec();
        assert!(!store.add(&detail(1, "Lost")).unwrap());

        assert_eq!(store.entries(), snapshot.as_slice());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);
        store.add(&detail(1, "Lost")).unwrap();

        assert!(!store.remove(42).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.has(1));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);
        store.add(&detail(3, "C")).unwrap();
        store.add(&detail(1, "A")).unwrap();
        store.add(&detail(2, "B")).unwrap();
        store.remove(1).unwrap();

        let ids: Vec<ShowId> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_reload_round_trip() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);
        store.add(&detail(10, "Fargo")).unwrap();
        store.add(&detail(4, "Arrow")).unwrap();
        let expected = store.entries().to_vec();
        drop(store);

        let reloaded = FavoritesStore::load(&storage);
        assert_eq!(reloaded.entries(), expected.as_slice());
    }

    #[test]
    fn test_add_then_remove_then_reload_is_empty() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);
        store.add(&detail(5, "Glee")).unwrap();
        store.remove(5).unwrap();
        drop(store);

        let reloaded = FavoritesStore::load(&storage);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_malformed_payload_loads_empty() {
        let storage = MemoryStorage::new();
        storage.write(FAVORITES_KEY, "{not json").unwrap();

        let store = FavoritesStore::load(&storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_ids_collapsed_on_load() {
        let storage = MemoryStorage::new();
        storage
            .write(
                FAVORITES_KEY,
                r#"[{"id":1,"name":"First","image":null},{"id":1,"name":"Second"},{"id":2,"name":"Other"}]"#,
            )
            .unwrap();

        let store = FavoritesStore::load(&storage);
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].name, "First");
    }

    #[test]
    fn test_image_fallback() {
        let mut medium_and_original = detail(1, "A");
        assert_eq!(
            FavoriteEntry::from(&medium_and_original).image_url.as_deref(),
            Some("https://img/1/medium.jpg")
        );

        medium_and_original.thumbnail_url = None;
        assert_eq!(
            FavoriteEntry::from(&medium_and_original).image_url.as_deref(),
            Some("https://img/1/original.jpg")
        );

        medium_and_original.poster_url = None;
        assert_eq!(FavoriteEntry::from(&medium_and_original).image_url, None);
    }

    #[test]
    fn test_existing_favorite_keeps_snapshot() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);
        store.add(&detail(7, "Old Name")).unwrap();
        store.add(&detail(7, "New Name")).unwrap();

        assert_eq!(store.entries()[0].name, "Old Name");
    }

    #[test]
    fn test_persisted_format() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::load(&storage);
        store.add(&detail(5, "Glee")).unwrap();

        let payload = storage.read(FAVORITES_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"id": 5, "name": "Glee", "image": "https://img/5/medium.jpg"}])
        );
    }

    #[test]
    fn test_unreadable_storage_loads_empty() {
        let store = FavoritesStore::load(FailingStorage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_change() {
        let mut store = FavoritesStore::load(FailingStorage);

        let result = store.add(&detail(8, "Dark"));
        assert!(matches!(result, Err(StorageError::WriteFailed { .. })));
        assert!(store.has(8));

        let result = store.remove(8);
        assert!(matches!(result, Err(StorageError::WriteFailed { .. })));
        assert!(!store.has(8));
    }
}
