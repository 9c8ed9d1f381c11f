//! Persistence for the saved location list.
//!
//! The collection is small (see [`MAX_LOCATIONS`]), so [`DocumentStore`]
//! keeps every document in memory and rewrites the whole JSON file on each
//! change. The capacity and uniqueness rules are enforced here, under the
//! same lock as the write, so concurrent requests cannot slip past them.

use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    model::{Location, LocationDetails, LocationId},
};

/// Upper bound on the number of saved locations.
pub const MAX_LOCATIONS: usize = 5;

#[async_trait]
pub trait LocationStore: Send + Sync + Debug {
    /// All saved locations in insertion order.
    async fn list(&self) -> AppResult<Vec<Location>>;

    async fn get(&self, id: &LocationId) -> AppResult<Location>;

    /// Persist `candidate` under a fresh id.
    ///
    /// Fails with `CapacityExceeded` when the list is full and with
    /// `Duplicate` when the external id is already saved; capacity is
    /// checked first.
    async fn add(&self, candidate: LocationDetails) -> AppResult<Location>;

    /// Remove a location. Unknown ids are ignored.
    async fn delete(&self, id: &LocationId) -> AppResult<()>;
}

/// Checks whether `candidate` may join `existing`.
pub fn check_admission(existing: &[Location], candidate: &LocationDetails) -> AppResult<()> {
    if existing.len() >= MAX_LOCATIONS {
        return Err(AppError::CapacityExceeded);
    }
    if existing
        .iter()
        .any(|loc| loc.external_id == candidate.external_id)
    {
        return Err(AppError::Duplicate(candidate.external_id));
    }
    Ok(())
}

/// A collection of location documents, optionally backed by a JSON file.
#[derive(Debug)]
pub struct DocumentStore {
    path: Option<PathBuf>,
    docs: Mutex<Vec<Location>>,
}

impl DocumentStore {
    /// Open the collection stored at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let docs = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::storage(format!("Failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        tracing::info!(path = %path.display(), count = docs.len(), "opened location store");

        Ok(Self {
            path: Some(path),
            docs: Mutex::new(docs),
        })
    }

    /// A collection that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            docs: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, docs: &[Location]) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(docs)
            .map_err(|e| AppError::storage(format!("Failed to serialize locations: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| AppError::storage(format!("Failed to replace {}: {e}", path.display())))?;

        Ok(())
    }
}

#[async_trait]
impl LocationStore for DocumentStore {
    async fn list(&self) -> AppResult<Vec<Location>> {
        Ok(self.docs.lock().await.clone())
    }

    async fn get(&self, id: &LocationId) -> AppResult<Location> {
        self.docs
            .lock()
            .await
            .iter()
            .find(|loc| &loc.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.clone()))
    }

    async fn add(&self, candidate: LocationDetails) -> AppResult<Location> {
        let mut docs = self.docs.lock().await;
        check_admission(&docs, &candidate)?;

        let location = Location::from_details(LocationId::generate(), candidate);

        let mut updated = docs.clone();
        updated.push(location.clone());
        self.persist(&updated).await?;
        *docs = updated;

        tracing::info!(
            id = %location.id,
            gid = %location.external_id,
            name = %location.name,
            "location added"
        );
        Ok(location)
    }

    async fn delete(&self, id: &LocationId) -> AppResult<()> {
        let mut docs = self.docs.lock().await;
        if !docs.iter().any(|loc| &loc.id == id) {
            tracing::debug!(%id, "delete of unknown location ignored");
            return Ok(());
        }

        let updated: Vec<Location> = docs.iter().filter(|loc| &loc.id != id).cloned().collect();
        self.persist(&updated).await?;
        *docs = updated;

        tracing::info!(%id, "location deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExternalId;

    fn details(gid: i64, name: &str) -> LocationDetails {
        LocationDetails {
            external_id: ExternalId(gid),
            name: name.to_string(),
            country_code: "XX".to_string(),
            lat: gid as f64 / 1000.0,
            lng: -(gid as f64) / 1000.0,
        }
    }

    #[tokio::test]
    async fn add_assigns_id_and_lists_in_insertion_order() {
        let store = DocumentStore::in_memory();

        let a = store.add(details(1, "A")).await.expect("add A");
        let b = store.add(details(2, "B")).await.expect("add B");
        assert_ne!(a.id, b.id);
        assert_eq!(a.country, "XX");

        let listed = store.list().await.expect("list");
        assert_eq!(listed, vec![a.clone(), b]);
        assert_eq!(store.get(&a.id).await.expect("get"), a);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let store = DocumentStore::in_memory();
        let err = store.get(&LocationId::from("missing")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(id) if id.as_str() == "missing"));
    }

    #[tokio::test]
    async fn rejects_duplicate_external_id() {
        let store = DocumentStore::in_memory();
        store.add(details(42, "Paris")).await.expect("first add");

        let err = store.add(details(42, "Paris again")).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ExternalId(42))));
        assert_eq!(store.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn rejects_sixth_location() {
        let store = DocumentStore::in_memory();
        for gid in 1..=5 {
            store.add(details(gid, "x")).await.expect("add within capacity");
        }

        let err = store.add(details(6, "sixth")).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));
        assert_eq!(store.list().await.expect("list").len(), MAX_LOCATIONS);
    }

    #[tokio::test]
    async fn capacity_is_checked_before_duplicates() {
        let store = DocumentStore::in_memory();
        for gid in 1..=5 {
            store.add(details(gid, "x")).await.expect("add within capacity");
        }

        let err = store.add(details(3, "dup")).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = DocumentStore::in_memory();
        let a = store.add(details(1, "A")).await.expect("add");
        let b = store.add(details(2, "B")).await.expect("add");

        store.delete(&a.id).await.expect("delete");
        store.delete(&a.id).await.expect("second delete is a no-op");
        store
            .delete(&LocationId::from("never-existed"))
            .await
            .expect("unknown delete is a no-op");

        assert_eq!(store.list().await.expect("list"), vec![b]);
    }

    #[tokio::test]
    async fn freed_slot_can_be_reused() {
        let store = DocumentStore::in_memory();
        let mut saved = Vec::new();
        for gid in 1..=5 {
            saved.push(store.add(details(gid, "x")).await.expect("add"));
        }

        store.delete(&saved[0].id).await.expect("delete");
        store.add(details(6, "new")).await.expect("slot freed");

        let listed = store.list().await.expect("list");
        assert_eq!(listed.len(), MAX_LOCATIONS);
        let mut gids: Vec<_> = listed.iter().map(|l| l.external_id).collect();
        gids.sort();
        gids.dedup();
        assert_eq!(gids.len(), MAX_LOCATIONS);
    }

    #[tokio::test]
    async fn concurrent_adds_never_exceed_capacity() {
        let store = std::sync::Arc::new(DocumentStore::in_memory());

        let handles: Vec<_> = (1..=12)
            .map(|gid| {
                let store = store.clone();
                // Two tasks per external id to race duplicates as well.
                tokio::spawn(async move { store.add(details(gid % 6 + 1, "x")).await })
            })
            .collect();

        for handle in handles {
            let _ = handle.await.expect("task completes");
        }

        let listed = store.list().await.expect("list");
        assert_eq!(listed.len(), MAX_LOCATIONS);
        let mut gids: Vec<_> = listed.iter().map(|l| l.external_id).collect();
        gids.sort();
        gids.dedup();
        assert_eq!(gids.len(), listed.len());
    }

    #[tokio::test]
    async fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("locations.json");

        let store = DocumentStore::open(&path).await.expect("open new");
        assert!(store.list().await.expect("list").is_empty());
        let paris = store.add(details(2988507, "Paris")).await.expect("add");
        let oslo = store.add(details(3143244, "Oslo")).await.expect("add");
        store.delete(&oslo.id).await.expect("delete");
        drop(store);

        let reopened = DocumentStore::open(&path).await.expect("reopen");
        assert_eq!(reopened.list().await.expect("list"), vec![paris]);
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("locations.json");
        std::fs::write(&path, "{not json").expect("write");

        let err = DocumentStore::open(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
