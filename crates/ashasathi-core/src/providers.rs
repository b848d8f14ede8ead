//! Device capabilities consumed by record-creation and sync flows.
//!
//! The host app implements these over whatever the platform offers (GPS,
//! system notifications). Both are best-effort: a denied permission simply
//! means no location and no notification.

use std::sync::Mutex;

use crate::models::Coordinates;

/// Source of the device's current position.
pub trait LocationProvider {
    /// Current coordinates, or `None` if unavailable or permission was denied.
    fn current_location(&self) -> Option<Coordinates>;
}

/// Sink for user-facing alerts.
pub trait NotificationProvider {
    fn notify(&self, title: &str, body: &str);
}

/// A location fixed up front, e.g. handed over by the host shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Option<Coordinates> {
        self.0
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl NotificationProvider for SilentNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}

/// Keeps notifications in memory so the host can render them later.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<(String, String)>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all queued `(title, body)` pairs.
    pub fn drain(&self) -> Vec<(String, String)> {
        match self.entries.lock() {
            Ok(mut entries) => entries.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl NotificationProvider for NotificationLog {
    fn notify(&self, title: &str, body: &str) {
        let entry = (title.to_string(), body.to_string());
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
