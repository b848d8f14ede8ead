//! Upload of locally created records to the backend.
//!
//! Protocol:
//! 1. Check connectivity; offline runs touch nothing
//! 2. Push each unsynced patient, then each unsynced visit
//! 3. Mark a record synced only after the backend acknowledged it
//! 4. Records that keep failing stay unsynced for the next run
//!
//! Visits are append-only, so two entries can share an id while
//! `mark_synced` only ever flags the first one. A later duplicate therefore
//! cannot be cleared by a push; it is reported as stranded instead of being
//! uploaded again on every run.

mod transport;

pub use transport::*;

use std::collections::HashSet;

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{StoreConfig, SyncConfig};
use crate::models::{Patient, Visit};
use crate::providers::NotificationProvider;
use crate::storage::{KeyValueStore, StorageError};
use crate::store::{RecordKind, RecordStore};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No internet connection")]
    Offline,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// A record the run gave up on.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub kind: RecordKind,
    pub id: String,
    /// Push attempts made, including the last one
    pub attempts: u32,
    pub error: TransportError,
}

/// An unsynced entry whose id is already synced on an earlier entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StrandedRecord {
    pub kind: RecordKind,
    pub id: String,
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Patients flagged synced this run
    pub patients_synced: usize,
    /// Visits flagged synced this run
    pub visits_synced: usize,
    pub failures: Vec<SyncFailure>,
    /// Entries left unsynced because of a duplicate id
    pub stranded: Vec<StrandedRecord>,
}

impl SyncReport {
    /// True when nothing is left unsynced after the run.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.stranded.is_empty()
    }

    pub fn total_synced(&self) -> usize {
        self.patients_synced + self.visits_synced
    }
}

/// Drives one upload pass over the record store.
pub struct SyncCoordinator<'a, S, T: ?Sized> {
    store: &'a RecordStore<S>,
    transport: &'a T,
    config: SyncConfig,
    notifier: Option<&'a dyn NotificationProvider>,
}

impl<'a, S, T> SyncCoordinator<'a, S, T>
where
    S: KeyValueStore,
    T: SyncTransport + ?Sized,
{
    /// Create a coordinator with default retry settings.
    pub fn new(store: &'a RecordStore<S>, transport: &'a T) -> Self {
        Self {
            store,
            transport,
            config: SyncConfig::default(),
            notifier: None,
        }
    }

    /// Create a coordinator using the sync settings of `config`.
    pub fn from_config(store: &'a RecordStore<S>, transport: &'a T, config: &StoreConfig) -> Self {
        Self::new(store, transport).with_config(config.sync.clone())
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Announce run outcomes through `notifier`.
    pub fn with_notifier(mut self, notifier: &'a dyn NotificationProvider) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Push every unsynced record once (with retries).
    pub fn run(&self) -> SyncResult<SyncReport> {
        if !self.transport.is_online() {
            warn!("Sync skipped: device is offline");
            self.notify(
                "No internet connection",
                "Please connect to the internet to sync data.",
            );
            return Err(SyncError::Offline);
        }

        let mut report = SyncReport::default();
        let patients_synced = self.sync_kind::<Patient>(&mut report)?;
        let visits_synced = self.sync_kind::<Visit>(&mut report)?;
        report.patients_synced = patients_synced;
        report.visits_synced = visits_synced;

        info!(
            "Sync finished: {} patients, {} visits uploaded, {} failed, {} stranded",
            report.patients_synced,
            report.visits_synced,
            report.failures.len(),
            report.stranded.len()
        );
        if report.is_complete() {
            self.notify("Sync complete", "All records are up to date.");
        } else {
            self.notify(
                "Sync incomplete",
                &format!(
                    "{} records could not be uploaded and will be retried, {} share an id with a synced record.",
                    report.failures.len(),
                    report.stranded.len()
                ),
            );
        }

        Ok(report)
    }

    /// Push the unsynced records of one kind; returns how many were flagged synced.
    fn sync_kind<R: SyncRecord>(&self, report: &mut SyncReport) -> SyncResult<usize> {
        let all = self.store.get_all::<R>();
        let pending: Vec<&R> = all.iter().filter(|r| !r.is_synced()).collect();
        debug!("{} unsynced {} records", pending.len(), R::KIND);

        let mut seen = HashSet::new();
        let mut acknowledged = HashSet::new();
        let mut synced = 0;
        for record in pending {
            // One push per id: marking can only ever reach the first entry
            if !seen.insert(record.id()) {
                continue;
            }
            let first_synced = all
                .iter()
                .find(|r| r.id() == record.id())
                .is_some_and(|r| r.is_synced());
            if first_synced {
                acknowledged.insert(record.id().to_string());
                continue;
            }

            match self.push_with_retry(record) {
                Ok(()) => {
                    acknowledged.insert(record.id().to_string());
                    if self.store.mark_synced::<R>(record.id())? {
                        synced += 1;
                    }
                }
                Err((attempts, error)) => {
                    warn!(
                        "Giving up on {} {} after {} attempts: {}",
                        R::KIND,
                        record.id(),
                        attempts,
                        error
                    );
                    report.failures.push(SyncFailure {
                        kind: R::KIND,
                        id: record.id().to_string(),
                        attempts,
                        error,
                    });
                }
            }
        }

        for record in self.store.get_unsynced::<R>() {
            if acknowledged.contains(record.id()) {
                warn!(
                    "{} {} stays unsynced: an earlier entry with the same id is already synced",
                    R::KIND,
                    record.id()
                );
                report.stranded.push(StrandedRecord {
                    kind: R::KIND,
                    id: record.id().to_string(),
                });
            }
        }
        Ok(synced)
    }

    fn push_with_retry<R: SyncRecord>(&self, record: &R) -> Result<(), (u32, TransportError)> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match record.push_to(self.transport) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    debug!(
                        "Push of {} {} failed (attempt {}/{}): {}",
                        R::KIND,
                        record.id(),
                        attempt,
                        max_attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => return Err((attempt, e)),
            }
        }
    }

    fn notify(&self, title: &str, body: &str) {
        if let Some(notifier) = self.notifier {
            notifier.notify(title, body);
        }
    }
}
