//! Patient registration: allocate a patient id and store the record.
//!
//! Allocation reads the bucket maximum and the insert writes the next id, so
//! two signups reading the same maximum would collide. Each attempt therefore
//! runs inside an IMMEDIATE transaction, which holds the database write lock
//! from the read until the commit. The UNIQUE constraint on `patient_id`
//! catches writers that bypass this path; such a conflict is retried with a
//! fresh read, up to a bounded number of attempts.

use thiserror::Error;

use crate::db::{self, Database, DbError};
use crate::id::{AllocatorError, IdPrefix, PatientIdAllocator};
use crate::models::{PatientRecord, PatientSignup, ValidationError};

/// Default bound on allocate-and-insert attempts per signup.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Registration errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Invalid signup: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocatorError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("No free patient id in bucket {prefix} after {attempts} attempts")]
    AttemptsExhausted { prefix: IdPrefix, attempts: u32 },
}

pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Registers patients against one database.
pub struct PatientRegistry<'a> {
    db: &'a Database,
    allocator: PatientIdAllocator,
    max_attempts: u32,
}

impl<'a> PatientRegistry<'a> {
    /// Create a registry with the default allocator and attempt bound.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            allocator: PatientIdAllocator::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_allocator(mut self, allocator: PatientIdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Bound the attempts per signup. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn allocator(&self) -> &PatientIdAllocator {
        &self.allocator
    }

    /// Validate the signup, allocate its patient id, and store the record.
    ///
    /// Lookup and storage failures abort at once; only a patient id conflict
    /// is retried.
    pub fn register(&self, signup: &PatientSignup) -> RegistrationResult<PatientRecord> {
        signup.validate()?;

        // Fixed for all attempts, even if the year turns mid-signup
        let prefix = self.allocator.prefix_for(&signup.country);

        for attempt in 1..=self.max_attempts {
            match self.try_register(signup, &prefix) {
                Ok(record) => {
                    tracing::info!(
                        patient_id = %record.patient_id,
                        account_id = %record.account_id,
                        attempt,
                        "Registered patient"
                    );
                    return Ok(record);
                }
                Err(RegistrationError::Database(DbError::DuplicatePatientId(patient_id))) => {
                    tracing::warn!(
                        patient_id = %patient_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Patient id taken concurrently, retrying allocation"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(RegistrationError::AttemptsExhausted {
            prefix,
            attempts: self.max_attempts,
        })
    }

    /// One allocate-and-insert attempt in a single write transaction.
    fn try_register(
        &self,
        signup: &PatientSignup,
        prefix: &IdPrefix,
    ) -> RegistrationResult<PatientRecord> {
        let tx = self.db.immediate_transaction()?;

        let lookup = |prefix: &IdPrefix| db::max_patient_id_with_prefix(&tx, prefix);
        let patient_id = self.allocator.generate_in(prefix, &lookup)?;

        let record = signup.clone().into_record(patient_id);
        db::insert_patient_row(&tx, &record)?;

        tx.commit().map_err(DbError::from)?;
        Ok(record)
    }
}
