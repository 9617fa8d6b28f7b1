// src/services/persistence.rs
//! Best-effort local cache of the current dataset.
//!
//! The store is a directory of JSON files, one per key. Reads never fail the
//! caller: a missing, unreadable or incompatible value restores as "nothing
//! stored".

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::TRACING_TARGET_STORE;
use crate::error::StoreError;
use crate::services::dataset::DatasetDescriptor;

/// Key holding the serialized [`DatasetDescriptor`].
pub const CURRENT_DATASET_KEY: &str = "current_dataset";

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<local data dir>/insight-chat`, when the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temporary file so a crash never leaves half a value.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Read the stored dataset, if there is a usable one.
pub fn restore_dataset(store: &LocalStore) -> Option<DatasetDescriptor> {
    let raw = match store.get_item(CURRENT_DATASET_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(target: TRACING_TARGET_STORE, "no stored dataset");
            return None;
        }
        Err(err) => {
            warn!(target: TRACING_TARGET_STORE, error = %err, "could not read stored dataset");
            return None;
        }
    };

    match serde_json::from_str::<DatasetDescriptor>(&raw) {
        Ok(dataset) if dataset.is_usable() => {
            debug!(
                target: TRACING_TARGET_STORE,
                dataset_id = %dataset.dataset_id,
                "restored dataset"
            );
            Some(dataset)
        }
        Ok(_) => {
            debug!(target: TRACING_TARGET_STORE, "stored dataset has no id, ignoring");
            None
        }
        Err(err) => {
            debug!(
                target: TRACING_TARGET_STORE,
                error = %err,
                "stored dataset is unreadable, ignoring"
            );
            None
        }
    }
}

pub fn persist_dataset(store: &LocalStore, dataset: &DatasetDescriptor) -> Result<(), StoreError> {
    let raw = serde_json::to_string(dataset)?;
    store.set_item(CURRENT_DATASET_KEY, &raw)?;
    debug!(
        target: TRACING_TARGET_STORE,
        dataset_id = %dataset.dataset_id,
        "stored dataset"
    );
    Ok(())
}
