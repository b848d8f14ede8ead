//! Record-creation flows behind the registration and visit forms.
//!
//! A flow takes what the form collected, stamps a fresh id and timestamp,
//! asks the location provider for coordinates and hands the record to the
//! store. The store itself never generates ids or timestamps.

use log::info;
use thiserror::Error;

use crate::models::{Patient, Visit, Vitals};
use crate::providers::LocationProvider;
use crate::storage::{KeyValueStore, StorageError};
use crate::store::RecordStore;

/// Oldest age the registration form accepts.
pub const MAX_AGE: u32 = 120;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type FlowResult<T> = Result<T, FlowError>;

/// Fields collected by the patient registration form.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientForm {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub address: String,
}

/// Fields collected by the visit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitForm {
    /// Selected patient; empty when nothing was picked
    pub patient_id: String,
    pub notes: String,
    pub vitals: Vitals,
}

/// Register a new patient and save it locally.
pub fn register_patient<S, L>(
    store: &RecordStore<S>,
    location: &L,
    form: PatientForm,
) -> FlowResult<Patient>
where
    S: KeyValueStore,
    L: LocationProvider + ?Sized,
{
    let name = form.name.trim();
    let address = form.address.trim();
    if name.is_empty() {
        return Err(FlowError::InvalidInput("name is required".into()));
    }
    if address.is_empty() {
        return Err(FlowError::InvalidInput("address is required".into()));
    }
    if form.age > MAX_AGE {
        return Err(FlowError::InvalidInput(format!(
            "age must be between 0 and {}",
            MAX_AGE
        )));
    }

    let patient = Patient::new(
        name.to_string(),
        form.age,
        form.gender,
        form.phone.trim().to_string(),
        address.to_string(),
    )
    .with_location(location.current_location());

    store.save(&patient)?;
    info!("Registered patient {} (saved locally)", patient.id);
    Ok(patient)
}

/// Record a visit for an already selected patient and save it locally.
///
/// Empty vitals are omitted from the record, not written as `"vitals": {}`.
pub fn record_visit<S, L>(store: &RecordStore<S>, location: &L, form: VisitForm) -> FlowResult<Visit>
where
    S: KeyValueStore,
    L: LocationProvider + ?Sized,
{
    if form.patient_id.trim().is_empty() {
        return Err(FlowError::InvalidInput(
            "select a patient to record the visit".into(),
        ));
    }

    let vitals = Vitals {
        blood_pressure: form
            .vitals
            .blood_pressure
            .map(|bp| bp.trim().to_string())
            .filter(|bp| !bp.is_empty()),
        ..form.vitals
    };

    let visit = Visit::new(form.patient_id, form.notes)
        .with_vitals(vitals)
        .with_location(location.current_location());

    store.save(&visit)?;
    info!("Recorded visit {} for patient {}", visit.id, visit.patient_id);
    Ok(visit)
}
