//! Record kinds the store knows how to persist.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Patient, Visit};

/// Which collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Patient,
    Visit,
}

impl RecordKind {
    /// Collection name, used as the slot suffix.
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Patient => "patients",
            RecordKind::Visit => "visits",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Patient => write!(f, "patient"),
            RecordKind::Visit => write!(f, "visit"),
        }
    }
}

/// How `save` treats a record whose id is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePolicy {
    /// Replace the existing entry in place, append otherwise.
    Upsert,
    /// Always append.
    Append,
}

/// A record that can be kept in a [`RecordStore`](super::RecordStore) collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const KIND: RecordKind;
    const SAVE_POLICY: SavePolicy;

    fn id(&self) -> &str;
    fn is_synced(&self) -> bool;
    fn set_synced(&mut self);
}

impl Record for Patient {
    const KIND: RecordKind = RecordKind::Patient;
    const SAVE_POLICY: SavePolicy = SavePolicy::Upsert;

    fn id(&self) -> &str {
        &self.id
    }

    fn is_synced(&self) -> bool {
        self.synced
    }

    fn set_synced(&mut self) {
        self.synced = true;
    }
}

// Visits never dedupe by id; a repeated save adds a second entry.
impl Record for Visit {
    const KIND: RecordKind = RecordKind::Visit;
    const SAVE_POLICY: SavePolicy = SavePolicy::Append;

    fn id(&self) -> &str {
        &self.id
    }

    fn is_synced(&self) -> bool {
        self.synced
    }

    fn set_synced(&mut self) {
        self.synced = true;
    }
}
