//! Visit models.

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Vital signs taken during a visit. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    /// Weight in kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Body temperature as read on the thermometer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Blood pressure as written, e.g. "120/80"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
}

impl Vitals {
    /// True when no vital was recorded.
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.temperature.is_none() && self.blood_pressure.is_none()
    }
}

/// A home visit to a registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Locally generated UUID
    pub id: String,
    /// Id of the visited patient (not checked by the store)
    pub patient_id: String,
    /// Visit timestamp (RFC 3339)
    pub date: String,
    /// Free-text notes
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    /// Whether the backend has acknowledged this record
    pub synced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Visit {
    /// Create a new, unsynced visit dated now.
    pub fn new(patient_id: String, notes: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            date: chrono::Utc::now().to_rfc3339(),
            notes,
            vitals: None,
            synced: false,
            latitude: None,
            longitude: None,
        }
    }

    /// Attach vitals; an empty set is dropped.
    ///
    /// The web client writes `"vitals": {}` instead. Both forms read back,
    /// the latter as `Some(Vitals::default())`.
    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = (!vitals.is_empty()).then_some(vitals);
        self
    }

    /// Attach the coordinates where the visit took place.
    pub fn with_location(mut self, location: Option<Coordinates>) -> Self {
        self.latitude = location.map(|c| c.latitude);
        self.longitude = location.map(|c| c.longitude);
        self
    }
}
