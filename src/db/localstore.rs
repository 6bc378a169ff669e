// src/db/localstore.rs
//! Offline fallback used when no database is configured. Only properties are
//! kept: one JSON array under a fixed storage key, loaded at startup and
//! rewritten after every mutation.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    db::propertydb::{validate_collection, PropertyExt},
    dtos::propertydtos::PropertyInput,
    error::ErrorMessage,
    models::propertymodel::{new_property_id, Property},
    service::error::ServiceError,
};

pub const STORAGE_KEY: &str = "mauritania_real_estate";

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    properties: RwLock<Vec<Property>>,
}

impl LocalStore {
    /// Opens the blob in `dir`. An unreadable or malformed blob is logged and
    /// the store starts empty.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(format!("{}.json", STORAGE_KEY));
        let properties = match Self::load(&path) {
            Ok(properties) => properties,
            Err(e) => {
                tracing::error!("{}; starting with an empty property list", e);
                Vec::new()
            }
        };
        tracing::info!(
            "offline store at {} holds {} properties",
            path.display(),
            properties.len()
        );

        LocalStore {
            path,
            properties: RwLock::new(properties),
        }
    }

    fn load(path: &Path) -> Result<Vec<Property>, ServiceError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read(path)
            .map_err(|e| ServiceError::Storage(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_slice::<Vec<Property>>(&raw)
            .map_err(|e| ServiceError::Storage(format!("malformed {}: {}", path.display(), e)))
    }

    /// Failures are logged and swallowed; the in-memory list stays authoritative.
    fn persist(&self, properties: &[Property]) {
        if let Err(e) = self.write_blob(properties) {
            tracing::error!("{}", e);
        }
    }

    fn write_blob(&self, properties: &[Property]) -> Result<(), ServiceError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                ServiceError::Storage(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }
        let blob = serde_json::to_vec(properties)
            .map_err(|e| ServiceError::Storage(format!("cannot serialize properties: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, blob)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ServiceError::Storage(format!("cannot write {}: {}", self.path.display(), e))
            })
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string())
}

#[async_trait]
impl PropertyExt for LocalStore {
    async fn get_properties(&self) -> Result<Vec<Property>, ServiceError> {
        let properties = self.properties.read().await;
        let mut sorted = properties.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sorted)
    }

    async fn get_property(&self, property_id: &str) -> Result<Option<Property>, ServiceError> {
        let properties = self.properties.read().await;
        Ok(properties.iter().find(|p| p.id == property_id).cloned())
    }

    async fn create_property(&self, input: PropertyInput) -> Result<Property, ServiceError> {
        input.validate()?;

        let property = input.into_property(new_property_id(), Utc::now());
        let mut properties = self.properties.write().await;
        properties.insert(0, property.clone());
        self.persist(&properties);

        tracing::info!("property {} created (offline)", property.id);
        Ok(property)
    }

    async fn update_property(
        &self,
        property_id: &str,
        input: PropertyInput,
    ) -> Result<Property, ServiceError> {
        input.validate()?;

        let mut properties = self.properties.write().await;
        let slot = properties
            .iter_mut()
            .find(|p| p.id == property_id)
            .ok_or_else(not_found)?;
        let updated = input.into_property(slot.id.clone(), slot.created_at);
        *slot = updated.clone();
        self.persist(&properties);

        tracing::info!("property {} updated (offline)", property_id);
        Ok(updated)
    }

    async fn delete_property(&self, property_id: &str) -> Result<(), ServiceError> {
        let mut properties = self.properties.write().await;
        let before = properties.len();
        properties.retain(|p| p.id != property_id);
        if properties.len() == before {
            return Err(not_found());
        }
        self.persist(&properties);

        tracing::info!("property {} deleted (offline)", property_id);
        Ok(())
    }

    async fn replace_properties(&self, incoming: Vec<Property>) -> Result<usize, ServiceError> {
        validate_collection(&incoming)?;

        let mut properties = self.properties.write().await;
        *properties = incoming;
        self.persist(&properties);

        tracing::info!("offline property list replaced with {} records", properties.len());
        Ok(properties.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::propertydtos::fixtures::{input, nkc_input};

    #[tokio::test]
    async fn create_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        let created = store.create_property(nkc_input("Ahmed Salem")).await.unwrap();

        let reopened = LocalStore::open(dir.path());
        let listed = reopened.get_properties().await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        let first = store.create_property(nkc_input("First")).await.unwrap();
        let second = store.create_property(nkc_input("Second")).await.unwrap();

        let listed = store.get_properties().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert!(listed.iter().any(|p| p.id == first.id));
        assert!(listed.iter().any(|p| p.id == second.id));
    }

    #[tokio::test]
    async fn malformed_blob_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mauritania_real_estate.json"), b"{not json").unwrap();

        let store = LocalStore::open(dir.path());
        assert!(store.get_properties().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        let err = store
            .create_property(input("X", "آدرار", "تفرغ زينة"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.get_properties().await.unwrap().is_empty());
        assert!(!dir.path().join("mauritania_real_estate.json").exists());
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        let missing = new_property_id();
        assert!(matches!(
            store.update_property(&missing, nkc_input("X")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_property(&missing).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        let created = store.create_property(nkc_input("Old")).await.unwrap();

        let mut change = nkc_input("New");
        change.arrears = 4000;
        let updated = store.update_property(&created.id, change).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.tenant_name, "New");
        assert_eq!(updated.arrears, 4000);
    }

    #[tokio::test]
    async fn replace_discards_local_only_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        store.create_property(nkc_input("Local only")).await.unwrap();

        let remote = nkc_input("Remote").into_property(new_property_id(), Utc::now());
        let count = store.replace_properties(vec![remote.clone()]).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.get_properties().await.unwrap(), vec![remote]);
    }

    #[tokio::test]
    async fn rejected_replace_leaves_collection_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        let kept = store.create_property(nkc_input("Kept")).await.unwrap();

        let mut bad = nkc_input("Bad").into_property(new_property_id(), Utc::now());
        bad.rooms_count = 0;
        assert!(store.replace_properties(vec![bad]).await.is_err());
        assert_eq!(store.get_properties().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn blob_with_short_legacy_ids_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut legacy = serde_json::to_value(
            nkc_input("Legacy").into_property(new_property_id(), Utc::now()),
        )
        .unwrap();
        legacy["id"] = serde_json::json!("k3j2h1abc");
        std::fs::write(
            dir.path().join("mauritania_real_estate.json"),
            serde_json::to_vec(&vec![legacy]).unwrap(),
        )
        .unwrap();

        let store = LocalStore::open(dir.path());
        let found = store.get_property("k3j2h1abc").await.unwrap().unwrap();
        assert_eq!(found.tenant_name, "Legacy");

        store.update_property("k3j2h1abc", nkc_input("Renamed")).await.unwrap();
        let reopened = LocalStore::open(dir.path());
        let listed = reopened.get_properties().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "k3j2h1abc");
        assert_eq!(listed[0].tenant_name, "Renamed");
    }
}
