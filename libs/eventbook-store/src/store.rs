use std::collections::BTreeMap;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Document};
use crate::error::StoreError;

/// One stored record: its JSON value plus the version stamp that guards
/// whole-record replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Slot {
    pub(crate) version: u64,
    pub(crate) value: serde_json::Value,
}

pub(crate) type CollectionData = BTreeMap<String, Slot>;

pub(crate) struct StoreInner {
    collections: DashMap<String, Arc<RwLock<CollectionData>>>,
    /// When set, every committed mutation rewrites the JSON image here.
    image_path: Option<PathBuf>,
    /// Serializes image rewrites; collection locks are released before I/O.
    flush_lock: Mutex<()>,
}

/// Handle to the document store. Cheap to clone; all clones share state.
///
/// The store is opened once at process start and passed down explicitly to
/// whoever needs a [`Collection`] handle.
#[derive(Clone)]
pub struct DocStore {
    inner: Arc<StoreInner>,
}

impl DocStore {
    /// A store with no backing file. Used in tests and by `--mock` runs.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                collections: DashMap::new(),
                image_path: None,
                flush_lock: Mutex::new(()),
            }),
        }
    }

    /// Open a store backed by a JSON image file, loading it when present.
    ///
    /// A missing file is an empty store; the file is created on the first
    /// committed mutation.
    ///
    /// # Errors
    /// Fails when the image exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let collections = DashMap::new();

        if path.is_file() {
            let raw = std::fs::read(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let image: BTreeMap<String, CollectionData> = serde_json::from_slice(&raw)
                .map_err(|source| StoreError::CorruptImage {
                    path: path.clone(),
                    source,
                })?;
            for (name, data) in image {
                collections.insert(name, Arc::new(RwLock::new(data)));
            }
            tracing::info!(path = %path.display(), "loaded store image");
        } else {
            tracing::info!(path = %path.display(), "store image absent, starting empty");
        }

        Ok(Self {
            inner: Arc::new(StoreInner {
                collections,
                image_path: Some(path),
                flush_lock: Mutex::new(()),
            }),
        })
    }

    /// Typed handle to a named collection, created on first use.
    #[must_use]
    pub fn collection<T: Document>(&self, name: &str) -> Collection<T> {
        let data = self
            .inner
            .collections
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(RwLock::new(CollectionData::new())))
            .clone();
        Collection {
            name: name.to_owned(),
            data,
            store: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl StoreInner {
    /// Rewrite the image file from the current state of every collection.
    ///
    /// Writes to a temporary file in the image's directory and renames it
    /// into place, so readers never observe a half-written image.
    pub(crate) fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.image_path else {
            return Ok(());
        };

        let _guard = self.flush_lock.lock();

        let mut image: BTreeMap<String, CollectionData> = BTreeMap::new();
        for entry in &self.collections {
            image.insert(entry.key().clone(), entry.value().read().clone());
        }

        let bytes =
            serde_json::to_vec_pretty(&image).map_err(|source| StoreError::CorruptImage {
                path: path.clone(),
                source,
            })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tmp.write_all(&bytes).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tmp.persist(path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source: source.error,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use super::DocStore;
    use crate::collection::Document;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        body: String,
    }

    impl Document for Note {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn note(body: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            body: body.to_owned(),
        }
    }

    #[test]
    fn image_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let first = note("persisted");
        {
            let store = DocStore::open(&path).unwrap();
            store.collection::<Note>("notes").insert(&first).unwrap();
        }

        let reopened = DocStore::open(&path).unwrap();
        let notes = reopened.collection::<Note>("notes");
        let loaded = notes.get(first.id).unwrap().unwrap();
        assert_eq!(loaded.record, first);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn missing_image_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.collection::<Note>("notes").all().unwrap().is_empty());
    }

    #[test]
    fn corrupt_image_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(DocStore::open(&path).is_err());
    }

    #[test]
    fn removal_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let keep = note("keep");
        let drop = note("drop");
        {
            let store = DocStore::open(&path).unwrap();
            let notes = store.collection::<Note>("notes");
            notes.insert(&keep).unwrap();
            notes.insert(&drop).unwrap();
            assert!(notes.remove(drop.id).unwrap());
        }

        let reopened = DocStore::open(&path).unwrap();
        let notes = reopened.collection::<Note>("notes");
        assert!(notes.get(drop.id).unwrap().is_none());
        assert!(notes.get(keep.id).unwrap().is_some());
    }
}
