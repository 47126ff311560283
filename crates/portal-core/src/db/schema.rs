//! SQLite schema definition.

/// Complete database schema for the patient portal.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    account_id TEXT PRIMARY KEY,                 -- auth provider user id
    patient_id TEXT NOT NULL UNIQUE,             -- e.g. 25NP00001
    first_name TEXT NOT NULL,
    middle_name TEXT,
    last_name TEXT NOT NULL,
    gender TEXT,
    date_of_birth TEXT,
    country TEXT NOT NULL,
    user_contact TEXT,
    emergency_contact TEXT,
    medical_history TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    address TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Bucket maximum lookups order by length, then value
CREATE INDEX IF NOT EXISTS idx_patients_id_length
    ON patients(length(patient_id), patient_id);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(last_name, first_name);
"#;
