use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{CollectionData, Slot, StoreInner};

/// A record type storable in a [`Collection`].
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The id the record is keyed by.
    fn id(&self) -> Uuid;
}

/// A record together with the version stamp it was read at.
///
/// Pass the stamp back to [`Collection::replace`] to detect writes that
/// raced in between.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

/// Typed handle to one named collection.
pub struct Collection<T> {
    pub(crate) name: String,
    pub(crate) data: Arc<RwLock<CollectionData>>,
    pub(crate) store: Arc<StoreInner>,
    pub(crate) _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data: Arc::clone(&self.data),
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    /// Insert a new record at version 1.
    ///
    /// # Errors
    /// [`StoreError::DuplicateId`] when a record with the same id exists.
    pub fn insert(&self, record: &T) -> Result<u64, StoreError> {
        let id = record.id();
        let value = serde_json::to_value(record).map_err(|e| StoreError::encode(&self.name, e))?;
        {
            let mut data = self.data.write();
            if data.contains_key(&id.to_string()) {
                return Err(StoreError::duplicate_id(&self.name, id));
            }
            data.insert(id.to_string(), Slot { version: 1, value });
        }
        self.store.flush()?;
        Ok(1)
    }

    /// Fetch a record by id, along with its current version stamp.
    ///
    /// # Errors
    /// Only on decode failure; an absent id is `Ok(None)`.
    pub fn get(&self, id: Uuid) -> Result<Option<Versioned<T>>, StoreError> {
        let data = self.data.read();
        data.get(&id.to_string())
            .map(|slot| self.decode(slot))
            .transpose()
    }

    /// All records matching an exact-match predicate over the decoded form.
    ///
    /// # Errors
    /// On decode failure of any stored record.
    pub fn find<P>(&self, predicate: P) -> Result<Vec<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let data = self.data.read();
        let mut out = Vec::new();
        for slot in data.values() {
            let versioned = self.decode(slot)?;
            if predicate(&versioned.record) {
                out.push(versioned.record);
            }
        }
        Ok(out)
    }

    /// First record matching the predicate, with its version stamp.
    ///
    /// # Errors
    /// On decode failure of any stored record.
    pub fn find_one<P>(&self, predicate: P) -> Result<Option<Versioned<T>>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        let data = self.data.read();
        for slot in data.values() {
            let versioned = self.decode(slot)?;
            if predicate(&versioned.record) {
                return Ok(Some(versioned));
            }
        }
        Ok(None)
    }

    /// Every record in the collection.
    ///
    /// # Errors
    /// On decode failure of any stored record.
    pub fn all(&self) -> Result<Vec<T>, StoreError> {
        self.find(|_| true)
    }

    /// Replace the whole record, guarded by the version it was read at.
    ///
    /// Returns the new version stamp.
    ///
    /// # Errors
    /// [`StoreError::RecordNotFound`] when the record vanished,
    /// [`StoreError::VersionConflict`] when another write won the race.
    pub fn replace(&self, expected_version: u64, record: &T) -> Result<u64, StoreError> {
        let id = record.id();
        let value = serde_json::to_value(record).map_err(|e| StoreError::encode(&self.name, e))?;
        let new_version = {
            let mut data = self.data.write();
            let Some(slot) = data.get_mut(&id.to_string()) else {
                return Err(StoreError::record_not_found(&self.name, id));
            };
            if slot.version != expected_version {
                return Err(StoreError::version_conflict(
                    &self.name,
                    id,
                    expected_version,
                    slot.version,
                ));
            }
            slot.version += 1;
            slot.value = value;
            slot.version
        };
        self.store.flush()?;
        Ok(new_version)
    }

    /// Remove a record by id. Returns whether it was present.
    ///
    /// # Errors
    /// Only on image flush failure.
    pub fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = self.data.write().remove(&id.to_string()).is_some();
        if removed {
            self.store.flush()?;
        }
        Ok(removed)
    }

    /// Whether a record with the given id exists.
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.data.read().contains_key(&id.to_string())
    }

    fn decode(&self, slot: &Slot) -> Result<Versioned<T>, StoreError> {
        let record = serde_json::from_value(slot.value.clone())
            .map_err(|e| StoreError::decode(&self.name, e))?;
        Ok(Versioned {
            record,
            version: slot.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use crate::{DocStore, Document, StoreError};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        id: Uuid,
        label: String,
        count: u32,
    }

    impl Document for Counter {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn counter(label: &str) -> Counter {
        Counter {
            id: Uuid::new_v4(),
            label: label.to_owned(),
            count: 0,
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        let c = counter("hits");
        counters.insert(&c).unwrap();

        let got = counters.get(c.id).unwrap().unwrap();
        assert_eq!(got.record, c);
        assert_eq!(got.version, 1);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        let c = counter("hits");
        counters.insert(&c).unwrap();

        let err = counters.insert(&c).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));
    }

    #[test]
    fn find_filters_by_field() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        counters.insert(&counter("hits")).unwrap();
        counters.insert(&counter("misses")).unwrap();

        let hits = counters.find(|c| c.label == "hits").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "hits");
    }

    #[test]
    fn replace_bumps_version() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        let c = counter("hits");
        counters.insert(&c).unwrap();

        let mut read = counters.get(c.id).unwrap().unwrap();
        read.record.count = 7;
        let v2 = counters.replace(read.version, &read.record).unwrap();
        assert_eq!(v2, 2);

        let got = counters.get(c.id).unwrap().unwrap();
        assert_eq!(got.record.count, 7);
        assert_eq!(got.version, 2);
    }

    #[test]
    fn stale_replace_is_a_version_conflict() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        let c = counter("hits");
        counters.insert(&c).unwrap();

        // Two readers at version 1; the slower writer must lose.
        let fast = counters.get(c.id).unwrap().unwrap();
        let slow = counters.get(c.id).unwrap().unwrap();
        counters.replace(fast.version, &fast.record).unwrap();

        let err = counters.replace(slow.version, &slow.record).unwrap_err();
        assert!(err.is_version_conflict());
    }

    #[test]
    fn replace_of_removed_record_is_not_found() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        let c = counter("hits");
        counters.insert(&c).unwrap();
        let read = counters.get(c.id).unwrap().unwrap();
        assert!(counters.remove(c.id).unwrap());

        let err = counters.replace(read.version, &read.record).unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound { .. }));
    }

    #[test]
    fn remove_reports_presence() {
        let store = DocStore::in_memory();
        let counters = store.collection::<Counter>("counters");
        let c = counter("hits");
        counters.insert(&c).unwrap();

        assert!(counters.remove(c.id).unwrap());
        assert!(!counters.remove(c.id).unwrap());
    }
}
