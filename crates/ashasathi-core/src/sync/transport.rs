//! Backend transport used by the sync coordinator.

use thiserror::Error;

use crate::models::{Patient, Visit};
use crate::store::Record;

/// Why a push did not reach an acknowledged state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Temporary failure (timeout, 5xx); the same push may be retried.
    #[error("Retryable transport failure: {0}")]
    Retryable(String),

    /// The backend refused the record; retrying will not help.
    #[error("Rejected by backend: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Retryable(_))
    }
}

/// Uploads records to the remote backend.
///
/// `Ok(())` must mean the backend acknowledged the record; only then is it
/// marked synced locally.
pub trait SyncTransport {
    /// Whether the device currently has connectivity.
    fn is_online(&self) -> bool;

    fn push_patient(&self, patient: &Patient) -> Result<(), TransportError>;

    fn push_visit(&self, visit: &Visit) -> Result<(), TransportError>;
}

/// Records the coordinator can push.
pub trait SyncRecord: Record {
    fn push_to<T: SyncTransport + ?Sized>(&self, transport: &T) -> Result<(), TransportError>;
}

impl SyncRecord for Patient {
    fn push_to<T: SyncTransport + ?Sized>(&self, transport: &T) -> Result<(), TransportError> {
        transport.push_patient(self)
    }
}

impl SyncRecord for Visit {
    fn push_to<T: SyncTransport + ?Sized>(&self, transport: &T) -> Result<(), TransportError> {
        transport.push_visit(self)
    }
}
