//! Environment-driven configuration, end to end.
//!
//! Kept in its own test binary: it mutates process environment variables.

use std::cell::Cell;

use ashasathi_core::config::{ENV_DB_PATH, ENV_NAMESPACE, ENV_SYNC_MAX_ATTEMPTS};
use ashasathi_core::models::{Patient, Visit};
use ashasathi_core::{open_store, StoreConfig, SyncCoordinator, SyncTransport, TransportError};

/// Backend that is reachable but times out on every push.
#[derive(Default)]
struct FlakyBackend {
    pushes: Cell<u32>,
}

impl SyncTransport for FlakyBackend {
    fn is_online(&self) -> bool {
        true
    }

    fn push_patient(&self, _patient: &Patient) -> Result<(), TransportError> {
        self.pushes.set(self.pushes.get() + 1);
        Err(TransportError::Retryable("timeout".into()))
    }

    fn push_visit(&self, _visit: &Visit) -> Result<(), TransportError> {
        self.pushes.set(self.pushes.get() + 1);
        Err(TransportError::Retryable("timeout".into()))
    }
}

#[test]
fn test_env_config_drives_store_and_sync() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("field.db");
    std::env::set_var(ENV_NAMESPACE, "pilot");
    std::env::set_var(ENV_DB_PATH, &db_path);
    std::env::set_var(ENV_SYNC_MAX_ATTEMPTS, "2");

    let config = StoreConfig::from_env()?;
    assert_eq!(config.sync.max_attempts, 2);

    let store = open_store(&config)?;
    store.save(&Patient::new(
        "Usha".into(),
        52,
        "female".into(),
        "".into(),
        "Sitapur".into(),
    ))?;

    let backend = FlakyBackend::default();
    let report = SyncCoordinator::from_config(&store, &backend, &config).run()?;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].attempts, 2);
    assert_eq!(backend.pushes.get(), 2);
    assert!(db_path.exists());
    assert_eq!(store.stats().unsynced, 1);

    // A bad attempt count is refused rather than silently defaulted
    std::env::set_var(ENV_SYNC_MAX_ATTEMPTS, "0");
    assert!(StoreConfig::from_env().is_err());
    assert!(ashasathi_core::open_database_from_env().is_err());

    std::env::remove_var(ENV_SYNC_MAX_ATTEMPTS);
    let core = ashasathi_core::open_database_from_env()?;
    assert_eq!(core.list_patients()?.len(), 1);
    Ok(())
}
