//! User preferences kept next to the records.

use log::debug;

use crate::storage::{KeyValueStore, StorageResult};

/// Slot for the SMS messages toggle.
pub const MESSAGES_ENABLED_KEY: &str = "messages_enabled";

/// Dashboard toggles persisted on the device.
///
/// Preferences survive [`RecordStore::clear_all`](crate::RecordStore::clear_all).
pub struct Preferences<S> {
    storage: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Whether SMS notifications are on. Anything but a stored `true` is off.
    pub fn messages_enabled(&self) -> bool {
        matches!(
            self.storage.get(MESSAGES_ENABLED_KEY),
            Ok(Some(value)) if value == b"true"
        )
    }

    pub fn set_messages_enabled(&self, enabled: bool) -> StorageResult<()> {
        debug!("Messages {}", if enabled { "enabled" } else { "disabled" });
        let value: &[u8] = if enabled { b"true" } else { b"false" };
        self.storage.set(MESSAGES_ENABLED_KEY, value)
    }
}
