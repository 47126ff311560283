//! Patient signup form data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PatientRecord;
use crate::id::PatientId;

/// Signup validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Data submitted by a patient signing up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSignup {
    /// Id issued by the authentication provider
    pub account_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    /// Country name, used to pick the patient id bucket
    pub country: String,
    /// Dialing code for `user_contact`, e.g. "+977"
    pub user_contact_code: String,
    pub user_contact: Option<String>,
    /// Dialing code for `emergency_contact`
    pub emergency_contact_code: String,
    pub emergency_contact: Option<String>,
    /// Comma-separated conditions as typed in the form
    pub medical_history: String,
    pub address: Option<String>,
}

impl PatientSignup {
    /// Create a signup with required fields and a fresh account id.
    pub fn new(first_name: String, last_name: String, country: String) -> Self {
        Self {
            account_id: uuid::Uuid::new_v4().to_string(),
            first_name,
            middle_name: None,
            last_name,
            gender: None,
            date_of_birth: None,
            country,
            user_contact_code: String::new(),
            user_contact: None,
            emergency_contact_code: String::new(),
            emergency_contact: None,
            medical_history: String::new(),
            address: None,
        }
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("account_id", &self.account_id),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("country", &self.country),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        Ok(())
    }

    /// Build the stored record for an allocated patient id.
    pub fn into_record(self, patient_id: PatientId) -> PatientRecord {
        let user_contact = with_dialing_code(&self.user_contact_code, self.user_contact);
        let emergency_contact =
            with_dialing_code(&self.emergency_contact_code, self.emergency_contact);
        let medical_history = split_medical_history(&self.medical_history);

        PatientRecord {
            account_id: self.account_id,
            patient_id,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            country: self.country,
            user_contact,
            emergency_contact,
            medical_history,
            address: self.address,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn with_dialing_code(code: &str, number: Option<String>) -> Option<String> {
    number
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("{}{}", code, n.trim()))
}

/// Split "asthma, diabetes" into separate entries.
pub fn split_medical_history(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdPrefix;

    fn signup() -> PatientSignup {
        PatientSignup::new("Sita".into(), "Sharma".into(), "Nepal".into())
    }

    #[test]
    fn test_new_signup() {
        let s = signup();
        assert_eq!(s.account_id.len(), 36); // UUID format
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut s = signup();
        s.country = "  ".into();
        assert_eq!(s.validate(), Err(ValidationError::MissingField("country")));

        let mut s = signup();
        s.first_name.clear();
        assert_eq!(s.validate(), Err(ValidationError::MissingField("first_name")));
    }

    #[test]
    fn test_into_record_contacts() {
        let mut s = signup();
        s.user_contact_code = "+977".into();
        s.user_contact = Some("9800000000".into());
        s.emergency_contact_code = "+977".into();
        s.emergency_contact = Some("  ".into());

        let record = s.into_record(IdPrefix::new(2025, "NP").seed());
        assert_eq!(record.patient_id.as_str(), "25NP00001");
        assert_eq!(record.user_contact, Some("+9779800000000".into()));
        assert_eq!(record.emergency_contact, None);
    }

    #[test]
    fn test_split_medical_history() {
        assert_eq!(
            split_medical_history("asthma, diabetes ,, hypertension "),
            vec!["asthma", "diabetes", "hypertension"]
        );
        assert!(split_medical_history("").is_empty());
    }

    #[test]
    fn test_display_name() {
        let mut s = signup();
        s.middle_name = Some("Kumari".into());
        let record = s.into_record(IdPrefix::new(2025, "NP").seed());
        assert_eq!(record.display_name(), "Sita Kumari Sharma");
    }
}
