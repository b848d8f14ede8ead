//! Patient models.

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// A registered patient, stored locally until the backend acknowledges it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Locally generated UUID
    pub id: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender as entered on the form ("female", "male", "other")
    pub gender: String,
    /// Contact phone number, may be empty
    pub phone: String,
    /// Village / household address
    pub address: String,
    /// Registration timestamp (RFC 3339)
    pub created_at: String,
    /// Whether the backend has acknowledged this record
    pub synced: bool,
    /// WGS84 latitude at registration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// WGS84 longitude at registration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Patient {
    /// Create a new, unsynced patient with a fresh id and timestamp.
    pub fn new(name: String, age: u32, gender: String, phone: String, address: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            age,
            gender,
            phone,
            address,
            created_at: chrono::Utc::now().to_rfc3339(),
            synced: false,
            latitude: None,
            longitude: None,
        }
    }

    /// Attach the coordinates where the patient was registered.
    pub fn with_location(mut self, location: Option<Coordinates>) -> Self {
        self.latitude = location.map(|c| c.latitude);
        self.longitude = location.map(|c| c.longitude);
        self
    }

    /// Coordinates, if both halves were captured.
    pub fn location(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}
