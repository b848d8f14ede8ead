//! AshaSathi Core Library
//!
//! Local-first patient and visit registration for community health workers.
//!
//! # Architecture
//!
//! ```text
//! Registration / Visit form
//!            │
//!   flows (id, timestamp, location)
//!            │
//!   ┌────────▼─────────┐        ┌──────────────────┐
//!   │   RecordStore    │◄───────┤ SyncCoordinator  │──► backend (SyncTransport)
//!   │ save / unsynced  │  mark  │ push when online │
//!   │ mark_synced      │ synced └──────────────────┘
//!   └────────┬─────────┘
//!            │ one JSON array per slot
//!   ┌────────▼─────────┐
//!   │  KeyValueStore   │  SQLite on device, memory in tests
//!   └──────────────────┘
//! ```
//!
//! # Core Principle
//!
//! **A record is only marked synced after the backend acknowledged it.**
//! Until then it stays in the unsynced view, across restarts.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Visit, Vitals, Coordinates)
//! - [`storage`]: Key-value substrate (memory, SQLite)
//! - [`store`]: Record store with sync-state tracking
//! - [`sync`]: Upload coordinator and transport trait
//! - [`flows`]: Patient registration and visit recording
//! - [`providers`]: Location and notification capabilities
//! - [`settings`]: Persisted user preferences
//! - [`config`]: Store configuration

pub mod config;
pub mod flows;
pub mod models;
pub mod providers;
pub mod settings;
pub mod storage;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::{ConfigError, StoreConfig, SyncConfig};
pub use flows::{record_visit, register_patient, FlowError, PatientForm, VisitForm};
pub use models::{Coordinates, Patient, Visit, Vitals};
pub use providers::{FixedLocation, LocationProvider, NotificationProvider};
pub use settings::Preferences;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError, StorageResult};
pub use store::{Record, RecordKind, RecordStore, StoreStats};
pub use sync::{
    StrandedRecord, SyncCoordinator, SyncError, SyncReport, SyncTransport, TransportError,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

/// Open the SQLite-backed store described by `config`.
pub fn open_store(config: &StoreConfig) -> StorageResult<RecordStore<SqliteStore>> {
    let storage = match &config.database_path {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_in_memory()?,
    };
    Ok(RecordStore::with_namespace(storage, config.namespace.clone()))
}

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum AshaSathiError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<StorageError> for AshaSathiError {
    fn from(e: StorageError) -> Self {
        AshaSathiError::StorageError(e.to_string())
    }
}

impl From<ConfigError> for AshaSathiError {
    fn from(e: ConfigError) -> Self {
        AshaSathiError::InvalidInput(e.to_string())
    }
}

impl From<FlowError> for AshaSathiError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::InvalidInput(msg) => AshaSathiError::InvalidInput(msg),
            FlowError::Storage(e) => e.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for AshaSathiError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        AshaSathiError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<AshaSathiCore>, AshaSathiError> {
    let config = StoreConfig {
        database_path: Some(path.into()),
        ..StoreConfig::default()
    };
    AshaSathiCore::from_config(&config)
}

/// Open the store configured by the `ASHASATHI_*` environment variables.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<AshaSathiCore>, AshaSathiError> {
    AshaSathiCore::from_config(&StoreConfig::from_env()?)
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<AshaSathiCore>, AshaSathiError> {
    AshaSathiCore::from_config(&StoreConfig::default())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct AshaSathiCore {
    store: Arc<Mutex<RecordStore<SqliteStore>>>,
}

impl AshaSathiCore {
    fn from_config(config: &StoreConfig) -> Result<Arc<Self>, AshaSathiError> {
        let store = open_store(config)?;
        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
        }))
    }
}

#[uniffi::export]
impl AshaSathiCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient from form input.
    pub fn register_patient(
        &self,
        form: FfiPatientForm,
        location: Option<FfiCoordinates>,
    ) -> Result<FfiPatient, AshaSathiError> {
        let store = self.store.lock()?;
        let location = FixedLocation(location.map(Into::into));
        let patient = flows::register_patient(&*store, &location, form.into())?;
        Ok(patient.into())
    }

    /// Insert or replace a patient by id.
    pub fn save_patient(&self, patient: FfiPatient) -> Result<(), AshaSathiError> {
        let store = self.store.lock()?;
        store.save::<Patient>(&patient.into())?;
        Ok(())
    }

    /// All patients in registration order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(store.patients().into_iter().map(Into::into).collect())
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(store.get::<Patient>(&id).map(Into::into))
    }

    pub fn unsynced_patients(&self) -> Result<Vec<FfiPatient>, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(store
            .get_unsynced::<Patient>()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Flag a patient as acknowledged by the backend. Unknown ids are ignored.
    pub fn mark_patient_synced(&self, id: String) -> Result<(), AshaSathiError> {
        let store = self.store.lock()?;
        store.mark_synced::<Patient>(&id)?;
        Ok(())
    }

    // =========================================================================
    // Visit Operations
    // =========================================================================

    /// Record a visit from form input.
    pub fn record_visit(
        &self,
        form: FfiVisitForm,
        location: Option<FfiCoordinates>,
    ) -> Result<FfiVisit, AshaSathiError> {
        let store = self.store.lock()?;
        let location = FixedLocation(location.map(Into::into));
        let visit = flows::record_visit(&*store, &location, form.into())?;
        Ok(visit.into())
    }

    /// Append a visit.
    pub fn save_visit(&self, visit: FfiVisit) -> Result<(), AshaSathiError> {
        let store = self.store.lock()?;
        store.save::<Visit>(&visit.into())?;
        Ok(())
    }

    pub fn list_visits(&self) -> Result<Vec<FfiVisit>, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(store.visits().into_iter().map(Into::into).collect())
    }

    pub fn unsynced_visits(&self) -> Result<Vec<FfiVisit>, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(store
            .get_unsynced::<Visit>()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Flag a visit as acknowledged by the backend. Unknown ids are ignored.
    pub fn mark_visit_synced(&self, id: String) -> Result<(), AshaSathiError> {
        let store = self.store.lock()?;
        store.mark_synced::<Visit>(&id)?;
        Ok(())
    }

    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Drop all local patients and visits.
    pub fn clear_all(&self) -> Result<(), AshaSathiError> {
        let store = self.store.lock()?;
        store.clear_all()?;
        Ok(())
    }

    /// Dashboard counts.
    pub fn get_stats(&self) -> Result<FfiStoreStats, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(store.stats().into())
    }

    pub fn messages_enabled(&self) -> Result<bool, AshaSathiError> {
        let store = self.store.lock()?;
        Ok(Preferences::new(store.storage()).messages_enabled())
    }

    pub fn set_messages_enabled(&self, enabled: bool) -> Result<(), AshaSathiError> {
        let store = self.store.lock()?;
        Preferences::new(store.storage()).set_messages_enabled(enabled)?;
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe coordinates.
#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<FfiCoordinates> for Coordinates {
    fn from(c: FfiCoordinates) -> Self {
        Coordinates {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
    pub synced: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            phone: patient.phone,
            address: patient.address,
            created_at: patient.created_at,
            synced: patient.synced,
            latitude: patient.latitude,
            longitude: patient.longitude,
        }
    }
}

impl From<FfiPatient> for Patient {
    fn from(patient: FfiPatient) -> Self {
        Patient {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            phone: patient.phone,
            address: patient.address,
            created_at: patient.created_at,
            synced: patient.synced,
            latitude: patient.latitude,
            longitude: patient.longitude,
        }
    }
}

/// FFI-safe registration form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub address: String,
}

impl From<FfiPatientForm> for PatientForm {
    fn from(form: FfiPatientForm) -> Self {
        PatientForm {
            name: form.name,
            age: form.age,
            gender: form.gender,
            phone: form.phone,
            address: form.address,
        }
    }
}

/// FFI-safe vitals.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVitals {
    pub weight: Option<f64>,
    pub temperature: Option<f64>,
    pub blood_pressure: Option<String>,
}

impl From<Vitals> for FfiVitals {
    fn from(v: Vitals) -> Self {
        Self {
            weight: v.weight,
            temperature: v.temperature,
            blood_pressure: v.blood_pressure,
        }
    }
}

impl From<FfiVitals> for Vitals {
    fn from(v: FfiVitals) -> Self {
        Vitals {
            weight: v.weight,
            temperature: v.temperature,
            blood_pressure: v.blood_pressure,
        }
    }
}

/// FFI-safe visit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisit {
    pub id: String,
    pub patient_id: String,
    pub date: String,
    pub notes: String,
    pub vitals: Option<FfiVitals>,
    pub synced: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Visit> for FfiVisit {
    fn from(visit: Visit) -> Self {
        Self {
            id: visit.id,
            patient_id: visit.patient_id,
            date: visit.date,
            notes: visit.notes,
            vitals: visit.vitals.map(Into::into),
            synced: visit.synced,
            latitude: visit.latitude,
            longitude: visit.longitude,
        }
    }
}

impl From<FfiVisit> for Visit {
    fn from(visit: FfiVisit) -> Self {
        Visit {
            id: visit.id,
            patient_id: visit.patient_id,
            date: visit.date,
            notes: visit.notes,
            vitals: visit.vitals.map(Into::into),
            synced: visit.synced,
            latitude: visit.latitude,
            longitude: visit.longitude,
        }
    }
}

/// FFI-safe visit form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitForm {
    pub patient_id: String,
    pub notes: String,
    pub vitals: FfiVitals,
}

impl From<FfiVisitForm> for VisitForm {
    fn from(form: FfiVisitForm) -> Self {
        VisitForm {
            patient_id: form.patient_id,
            notes: form.notes,
            vitals: form.vitals.into(),
        }
    }
}

/// FFI-safe dashboard counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStoreStats {
    pub patients: u32,
    pub visits: u32,
    pub unsynced: u32,
}

impl From<StoreStats> for FfiStoreStats {
    fn from(stats: StoreStats) -> Self {
        Self {
            patients: u32::try_from(stats.patients).unwrap_or(u32::MAX),
            visits: u32::try_from(stats.visits).unwrap_or(u32::MAX),
            unsynced: u32::try_from(stats.unsynced).unwrap_or(u32::MAX),
        }
    }
}
