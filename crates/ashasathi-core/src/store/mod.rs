//! Offline record store.
//!
//! Each record kind is kept as one JSON array under its own slot
//! (`{namespace}_patients`, `{namespace}_visits`). Every mutation is a full
//! read-modify-write of that array with a single `set` call.
//!
//! Reads favour availability: a missing or unparseable slot is an empty
//! collection. Writes propagate substrate failures (e.g. quota) to the caller.

mod record;

pub use record::*;

use log::{debug, warn};

use crate::config::DEFAULT_NAMESPACE;
use crate::models::{Patient, Visit};
use crate::storage::{KeyValueStore, StorageResult};

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub patients: usize,
    pub visits: usize,
    /// Unsynced patients plus unsynced visits
    pub unsynced: usize,
}

/// Patient and visit collections over a key-value substrate.
pub struct RecordStore<S> {
    storage: S,
    namespace: String,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Store using the default `ashasathi` slot namespace.
    pub fn new(storage: S) -> Self {
        Self::with_namespace(storage, DEFAULT_NAMESPACE)
    }

    /// Store whose slots are named `{namespace}_patients` / `{namespace}_visits`.
    pub fn with_namespace(storage: S, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    /// Underlying substrate.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Slot holding the collection for `kind`.
    pub fn slot(&self, kind: RecordKind) -> String {
        format!("{}_{}", self.namespace, kind.collection())
    }

    /// All records of kind `R`, in insertion order.
    ///
    /// Never fails: absent, corrupt or unreadable slots read as empty.
    pub fn get_all<R: Record>(&self) -> Vec<R> {
        match self.storage.get(&self.slot(R::KIND)) {
            Ok(bytes) => self.decode(bytes),
            Err(e) => {
                warn!("Reading {} collection failed, treating as empty: {}", R::KIND, e);
                Vec::new()
            }
        }
    }

    /// First record of kind `R` with the given id.
    pub fn get<R: Record>(&self, id: &str) -> Option<R> {
        self.get_all::<R>().into_iter().find(|r| r.id() == id)
    }

    /// Persist a record according to its kind's [`SavePolicy`].
    pub fn save<R: Record>(&self, record: &R) -> StorageResult<()> {
        let mut records = self.load::<R>()?;

        let replaced = match R::SAVE_POLICY {
            SavePolicy::Upsert => match records.iter().position(|r| r.id() == record.id()) {
                Some(index) => {
                    records[index] = record.clone();
                    true
                }
                None => false,
            },
            SavePolicy::Append => false,
        };
        if !replaced {
            records.push(record.clone());
        }

        debug!(
            "Saving {} {} ({}, {} total)",
            R::KIND,
            record.id(),
            if replaced { "replaced" } else { "appended" },
            records.len()
        );
        self.write(&records)
    }

    /// Records of kind `R` not yet acknowledged by the backend.
    pub fn get_unsynced<R: Record>(&self) -> Vec<R> {
        self.get_all::<R>()
            .into_iter()
            .filter(|r| !r.is_synced())
            .collect()
    }

    /// Flag the first record with `id` as synced.
    ///
    /// Returns whether a record matched. An unknown id is not an error and
    /// leaves the collection untouched.
    pub fn mark_synced<R: Record>(&self, id: &str) -> StorageResult<bool> {
        let mut records = self.load::<R>()?;

        match records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                record.set_synced();
                debug!("Marked {} {} synced", R::KIND, id);
                self.write(&records)?;
                Ok(true)
            }
            None => {
                debug!("No {} {} to mark synced", R::KIND, id);
                Ok(false)
            }
        }
    }

    /// Drop both collections.
    pub fn clear_all(&self) -> StorageResult<()> {
        self.storage.remove(&self.slot(RecordKind::Patient))?;
        self.storage.remove(&self.slot(RecordKind::Visit))?;
        debug!("Cleared all local records");
        Ok(())
    }

    /// Patient/visit counts and the total waiting for sync.
    pub fn stats(&self) -> StoreStats {
        let patients = self.get_all::<Patient>();
        let visits = self.get_all::<Visit>();
        let unsynced = patients.iter().filter(|p| !p.is_synced()).count()
            + visits.iter().filter(|v| !v.is_synced()).count();

        StoreStats {
            patients: patients.len(),
            visits: visits.len(),
            unsynced,
        }
    }

    // Convenience accessors for the two kinds.

    pub fn patients(&self) -> Vec<Patient> {
        self.get_all()
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.get_all()
    }

    pub fn save_patient(&self, patient: &Patient) -> StorageResult<()> {
        self.save(patient)
    }

    pub fn save_visit(&self, visit: &Visit) -> StorageResult<()> {
        self.save(visit)
    }

    /// Read for a write: corrupt data is dropped, substrate errors are not.
    fn load<R: Record>(&self) -> StorageResult<Vec<R>> {
        let bytes = self.storage.get(&self.slot(R::KIND))?;
        Ok(self.decode(bytes))
    }

    fn decode<R: Record>(&self, bytes: Option<Vec<u8>>) -> Vec<R> {
        let Some(bytes) = bytes else {
            return Vec::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Discarding malformed {} collection in slot {}: {}",
                    R::KIND,
                    self.slot(R::KIND),
                    e
                );
                Vec::new()
            }
        }
    }

    fn write<R: Record>(&self, records: &[R]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(records)?;
        self.storage.set(&self.slot(R::KIND), &bytes)
    }
}
