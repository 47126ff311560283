//! Patient database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::id::IdPrefix;
use crate::models::PatientRecord;

const PATIENT_COLUMNS: &str = r#"
    account_id, patient_id, first_name, middle_name, last_name, gender,
    date_of_birth, country, user_contact, emergency_contact, medical_history,
    address, created_at
"#;

/// Insert a patient row on any connection or transaction.
///
/// A taken `patient_id` is reported as [`DbError::DuplicatePatientId`].
pub fn insert_patient_row(conn: &Connection, patient: &PatientRecord) -> DbResult<()> {
    let medical_history_json = serde_json::to_string(&patient.medical_history)?;

    conn.execute(
        r#"
        INSERT INTO patients (
            account_id, patient_id, first_name, middle_name, last_name, gender,
            date_of_birth, country, user_contact, emergency_contact, medical_history,
            address, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
        params![
            patient.account_id,
            patient.patient_id.as_str(),
            patient.first_name,
            patient.middle_name,
            patient.last_name,
            patient.gender,
            patient.date_of_birth,
            patient.country,
            patient.user_contact,
            patient.emergency_contact,
            medical_history_json,
            patient.address,
            patient.created_at,
        ],
    )
    .map_err(|e| DbError::from_insert(e, patient.patient_id.as_str()))?;
    Ok(())
}

/// Rows of one bucket. `?1` is the prefix length in characters, `?2` the prefix.
///
/// Every suffix starts with a digit, so ids of a longer prefix that merely
/// starts with this one (`25I` vs `25IN`) stay out.
const BUCKET_FILTER: &str = r#"
    substr(patient_id, 1, ?1) = ?2
    AND substr(patient_id, ?1 + 1, 1) BETWEEN '0' AND '9'
"#;

/// Greatest patient id in `prefix`, in allocation order.
///
/// Longer suffixes belong to later regimes, so length is compared before the
/// value. The prefix match is exact and case-sensitive.
pub fn max_patient_id_with_prefix(conn: &Connection, prefix: &IdPrefix) -> DbResult<Option<String>> {
    let sql = format!(
        r#"
        SELECT patient_id
        FROM patients
        WHERE {}
        ORDER BY length(patient_id) DESC, patient_id DESC
        LIMIT 1
        "#,
        BUCKET_FILTER
    );
    conn.query_row(
        &sql,
        params![prefix.char_len() as i64, prefix.as_str()],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &PatientRecord) -> DbResult<()> {
        insert_patient_row(&self.conn, patient)
    }

    /// Get a patient by account ID.
    pub fn get_patient(&self, account_id: &str) -> DbResult<Option<PatientRecord>> {
        let sql = format!("SELECT {} FROM patients WHERE account_id = ?", PATIENT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, [account_id], PatientRow::from_row)
            .optional()?;

        row.map(|r| r.try_into()).transpose()
    }

    /// Get a patient by allocated patient ID.
    pub fn get_patient_by_patient_id(&self, patient_id: &str) -> DbResult<Option<PatientRecord>> {
        let sql = format!("SELECT {} FROM patients WHERE patient_id = ?", PATIENT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, [patient_id], PatientRow::from_row)
            .optional()?;

        row.map(|r| r.try_into()).transpose()
    }

    /// All patients of a bucket, in allocation order.
    pub fn list_patients_in_bucket(&self, prefix: &IdPrefix) -> DbResult<Vec<PatientRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM patients
            WHERE {}
            ORDER BY length(patient_id), patient_id
            "#,
            PATIENT_COLUMNS, BUCKET_FILTER
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt.query_map(
            params![prefix.char_len() as i64, prefix.as_str()],
            PatientRow::from_row,
        )?;

        rows.map(|row| PatientRecord::try_from(row?)).collect()
    }

    /// Number of registered patients.
    pub fn count_patients(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Raw row before JSON columns are decoded.
struct PatientRow {
    account_id: String,
    patient_id: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    gender: Option<String>,
    date_of_birth: Option<String>,
    country: String,
    user_contact: Option<String>,
    emergency_contact: Option<String>,
    medical_history: String,
    address: Option<String>,
    created_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            account_id: row.get(0)?,
            patient_id: row.get(1)?,
            first_name: row.get(2)?,
            middle_name: row.get(3)?,
            last_name: row.get(4)?,
            gender: row.get(5)?,
            date_of_birth: row.get(6)?,
            country: row.get(7)?,
            user_contact: row.get(8)?,
            emergency_contact: row.get(9)?,
            medical_history: row.get(10)?,
            address: row.get(11)?,
            created_at: row.get(12)?,
        })
    }
}

impl TryFrom<PatientRow> for PatientRecord {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(PatientRecord {
            account_id: row.account_id,
            patient_id: row.patient_id.into(),
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            gender: row.gender,
            date_of_birth: row.date_of_birth,
            country: row.country,
            user_contact: row.user_contact,
            emergency_contact: row.emergency_contact,
            medical_history: serde_json::from_str(&row.medical_history)?,
            address: row.address,
            created_at: row.created_at,
        })
    }
}
