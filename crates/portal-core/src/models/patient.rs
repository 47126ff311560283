//! Patient models.

use serde::{Deserialize, Serialize};

use crate::id::PatientId;

/// A registered patient as stored in the `patients` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Id of the authentication account this patient signed up with
    pub account_id: String,
    /// Allocated patient id, e.g. `25NP00001`
    pub patient_id: PatientId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<String>,
    /// Date of birth (ISO-8601 date)
    pub date_of_birth: Option<String>,
    /// Country name as chosen at signup
    pub country: String,
    /// Patient phone number, dialing code included
    pub user_contact: Option<String>,
    /// Emergency phone number, dialing code included
    pub emergency_contact: Option<String>,
    /// Known conditions, one entry per item
    pub medical_history: Vec<String>,
    pub address: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl PatientRecord {
    /// Full name with the middle name when present.
    pub fn display_name(&self) -> String {
        match self.middle_name.as_deref() {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}
