//! Patient Portal Core Library
//!
//! Patient registration for the healthcare portal, built around the patient
//! id allocator.
//!
//! # Architecture
//!
//! ```text
//!  Signup form ──► validate ──► BEGIN IMMEDIATE
//!                                     │
//!                     ┌───────────────▼───────────────┐
//!                     │        PatientIdAllocator     │
//!                     │  prefix = YY + country code   │
//!                     │  max id in bucket (store)     │
//!                     │  next = seed | increment(max) │
//!                     └───────────────┬───────────────┘
//!                                     │
//!                          INSERT patient, COMMIT
//!                                     │
//!                      patient_id taken? ──► retry (bounded)
//! ```
//!
//! # Modules
//!
//! - [`id`]: Country codes, suffix regimes and the allocator
//! - [`db`]: SQLite store and bucket lookups
//! - [`models`]: Signup form and patient record
//! - [`registration`]: Allocate-and-insert with conflict retry
//! - [`config`]: Environment configuration
//! - [`logging`]: Subscriber setup for embedding hosts

pub mod config;
pub mod db;
pub mod id;
pub mod logging;
pub mod models;
pub mod registration;

// Re-export commonly used types
pub use config::PortalConfig;
pub use db::Database;
pub use id::{
    increment, CountryCodeResolver, IdPrefix, PatientId, PatientIdAllocator, PatientIdLookup,
    Regime, Suffix,
};
pub use models::{PatientRecord, PatientSignup};
pub use registration::{PatientRegistry, RegistrationError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PortalError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Allocation error: {0}")]
    AllocationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for PortalError {
    fn from(e: db::DbError) -> Self {
        PortalError::DatabaseError(e.to_string())
    }
}

impl From<id::AllocatorError> for PortalError {
    fn from(e: id::AllocatorError) -> Self {
        PortalError::AllocationError(e.to_string())
    }
}

impl From<config::ConfigError> for PortalError {
    fn from(e: config::ConfigError) -> Self {
        PortalError::ConfigError(e.to_string())
    }
}

impl From<RegistrationError> for PortalError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Invalid(e) => PortalError::InvalidInput(e.to_string()),
            RegistrationError::Database(e) => e.into(),
            RegistrationError::Allocation(e) => e.into(),
            e @ RegistrationError::AttemptsExhausted { .. } => {
                PortalError::AllocationError(e.to_string())
            }
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for PortalError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PortalError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with default settings.
#[uniffi::export]
pub fn open_portal(path: String) -> Result<Arc<PortalCore>, PortalError> {
    let config = PortalConfig {
        database_path: path.into(),
        ..PortalConfig::default()
    };
    PortalCore::from_config(&config)
}

/// Open the database described by the environment (see [`config`]).
#[uniffi::export]
pub fn open_portal_from_env() -> Result<Arc<PortalCore>, PortalError> {
    let config = PortalConfig::from_env()?;
    PortalCore::from_config(&config)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_portal_in_memory() -> Result<Arc<PortalCore>, PortalError> {
    let db = Database::open_in_memory()?;
    Ok(PortalCore::new(db, &PortalConfig::default()))
}

/// Two-letter code used in patient ids for a country name.
#[uniffi::export]
pub fn resolve_country_code(country_name: String) -> String {
    CountryCodeResolver::new().resolve(&country_name)
}

/// Route library logs to stderr. Returns `false` if logging was already set up.
#[uniffi::export]
pub fn enable_logging(default_directive: String) -> bool {
    logging::init_logging(&default_directive)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PortalCore {
    db: Arc<Mutex<Database>>,
    allocator: PatientIdAllocator,
    max_attempts: u32,
}

impl PortalCore {
    fn new(db: Database, config: &PortalConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            allocator: config.allocator(),
            max_attempts: config.max_allocation_attempts,
        })
    }

    fn from_config(config: &PortalConfig) -> Result<Arc<Self>, PortalError> {
        tracing::info!(path = %config.database_path.display(), "Opening patient database");
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(db, config))
    }
}

#[uniffi::export]
impl PortalCore {
    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a patient and return the stored record with its patient id.
    pub fn register_patient(&self, signup: FfiPatientSignup) -> Result<FfiPatient, PortalError> {
        let db = self.db.lock()?;
        let registry = PatientRegistry::new(&db)
            .with_allocator(self.allocator.clone())
            .with_max_attempts(self.max_attempts);

        let record = registry.register(&signup.into())?;
        Ok(record.into())
    }

    /// Patient id the next signup from `country_name` would receive.
    ///
    /// Nothing is reserved; a registration in between changes the answer.
    pub fn next_patient_id(&self, country_name: String) -> Result<String, PortalError> {
        let db = self.db.lock()?;
        let id = self.allocator.generate(&country_name, &*db)?;
        Ok(id.into_string())
    }

    // =========================================================================
    // Patient Lookup
    // =========================================================================

    /// Get a patient by account ID.
    pub fn get_patient(&self, account_id: String) -> Result<Option<FfiPatient>, PortalError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&account_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Get a patient by patient ID.
    pub fn get_patient_by_patient_id(
        &self,
        patient_id: String,
    ) -> Result<Option<FfiPatient>, PortalError> {
        let db = self.db.lock()?;
        let patient = db.get_patient_by_patient_id(&patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Patients registered this year from `country_name`, in allocation order.
    pub fn list_bucket(&self, country_name: String) -> Result<Vec<FfiPatient>, PortalError> {
        let db = self.db.lock()?;
        let prefix = self.allocator.prefix_for(&country_name);
        let patients = db.list_patients_in_bucket(&prefix)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe signup form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSignup {
    /// Auth provider user id; a UUID is generated when absent
    pub account_id: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub country: String,
    pub user_contact_code: String,
    pub user_contact: Option<String>,
    pub emergency_contact_code: String,
    pub emergency_contact: Option<String>,
    pub medical_history: String,
    pub address: Option<String>,
}

impl From<FfiPatientSignup> for PatientSignup {
    fn from(form: FfiPatientSignup) -> Self {
        let mut signup = PatientSignup::new(form.first_name, form.last_name, form.country);
        if let Some(account_id) = form.account_id {
            signup.account_id = account_id;
        }
        signup.middle_name = form.middle_name;
        signup.gender = form.gender;
        signup.date_of_birth = form.date_of_birth;
        signup.user_contact_code = form.user_contact_code;
        signup.user_contact = form.user_contact;
        signup.emergency_contact_code = form.emergency_contact_code;
        signup.emergency_contact = form.emergency_contact;
        signup.medical_history = form.medical_history;
        signup.address = form.address;
        signup
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub account_id: String,
    pub patient_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub country: String,
    pub user_contact: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Vec<String>,
    pub address: Option<String>,
    pub created_at: String,
}

impl From<PatientRecord> for FfiPatient {
    fn from(patient: PatientRecord) -> Self {
        Self {
            account_id: patient.account_id,
            patient_id: patient.patient_id.into_string(),
            first_name: patient.first_name,
            middle_name: patient.middle_name,
            last_name: patient.last_name,
            gender: patient.gender,
            date_of_birth: patient.date_of_birth,
            country: patient.country,
            user_contact: patient.user_contact,
            emergency_contact: patient.emergency_contact,
            medical_history: patient.medical_history,
            address: patient.address,
            created_at: patient.created_at,
        }
    }
}
