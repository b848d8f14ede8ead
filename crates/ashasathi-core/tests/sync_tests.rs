//! End-to-end: register offline, sync later.

use std::cell::{Cell, RefCell};

use ashasathi_core::flows::{record_visit, register_patient, PatientForm, VisitForm};
use ashasathi_core::models::{Coordinates, Patient, Visit, Vitals};
use ashasathi_core::providers::{FixedLocation, NotificationLog};
use ashasathi_core::storage::MemoryStore;
use ashasathi_core::store::RecordStore;
use ashasathi_core::sync::{SyncCoordinator, SyncError, SyncTransport, TransportError};

/// Backend stand-in that can be switched offline and collects uploads.
#[derive(Default)]
struct FakeBackend {
    offline: Cell<bool>,
    patients: RefCell<Vec<Patient>>,
    visits: RefCell<Vec<Visit>>,
}

impl SyncTransport for FakeBackend {
    fn is_online(&self) -> bool {
        !self.offline.get()
    }

    fn push_patient(&self, patient: &Patient) -> Result<(), TransportError> {
        self.patients.borrow_mut().push(patient.clone());
        Ok(())
    }

    fn push_visit(&self, visit: &Visit) -> Result<(), TransportError> {
        if !self.patients.borrow().iter().any(|p| p.id == visit.patient_id) {
            return Err(TransportError::Rejected(format!(
                "unknown patient {}",
                visit.patient_id
            )));
        }
        self.visits.borrow_mut().push(visit.clone());
        Ok(())
    }
}

#[test]
fn test_offline_registration_then_sync() {
    let store = RecordStore::new(MemoryStore::new());
    let gps = FixedLocation(Some(Coordinates {
        latitude: 25.32,
        longitude: 82.97,
    }));

    let patient = register_patient(
        &store,
        &gps,
        PatientForm {
            name: "Savitri".into(),
            age: 31,
            gender: "female".into(),
            phone: "".into(),
            address: "Chaubepur".into(),
        },
    )
    .unwrap();
    record_visit(
        &store,
        &gps,
        VisitForm {
            patient_id: patient.id.clone(),
            notes: "Third trimester check".into(),
            vitals: Vitals {
                weight: Some(64.0),
                temperature: None,
                blood_pressure: Some("110/72".into()),
            },
        },
    )
    .unwrap();
    record_visit(
        &store,
        &gps,
        VisitForm {
            patient_id: "never-registered".into(),
            notes: "Wrong selection".into(),
            vitals: Vitals::default(),
        },
    )
    .unwrap();

    let backend = FakeBackend::default();
    let notifications = NotificationLog::new();
    let coordinator = SyncCoordinator::new(&store, &backend).with_notifier(&notifications);

    // Offline: nothing moves
    backend.offline.set(true);
    assert!(matches!(coordinator.run(), Err(SyncError::Offline)));
    assert_eq!(store.stats().unsynced, 3);
    assert_eq!(notifications.drain()[0].0, "No internet connection");

    // Online: the orphan visit is rejected, the rest goes through
    backend.offline.set(false);
    let report = coordinator.run().unwrap();

    assert_eq!(report.patients_synced, 1);
    assert_eq!(report.visits_synced, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(backend.patients.borrow()[0].id, patient.id);
    assert_eq!(notifications.drain()[0].0, "Sync incomplete");

    let left: Vec<_> = store
        .get_unsynced::<Visit>()
        .into_iter()
        .map(|v| v.patient_id)
        .collect();
    assert_eq!(left, ["never-registered"]);
    assert!(store.get_unsynced::<Patient>().is_empty());
}

#[test]
fn test_sync_with_nothing_pending() {
    let store = RecordStore::new(MemoryStore::new());
    let backend = FakeBackend::default();
    let notifications = NotificationLog::new();

    let report = SyncCoordinator::new(&store, &backend)
        .with_notifier(&notifications)
        .run()
        .unwrap();

    assert_eq!(report.total_synced(), 0);
    assert!(report.is_complete());
    assert_eq!(
        notifications.drain(),
        vec![(
            "Sync complete".to_string(),
            "All records are up to date.".to_string()
        )]
    );
}
