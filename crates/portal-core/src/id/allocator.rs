//! Patient id allocation against the current contents of the store.

use chrono::Datelike;
use thiserror::Error;

use crate::db::{self, Database, DbError, DbResult};

use super::{increment, CountryCodeResolver, IdPrefix, PatientId};

/// Allocator errors.
#[derive(Error, Debug)]
pub enum AllocatorError {
    #[error("Patient id lookup failed for prefix {prefix}: {source}")]
    LookupFailed {
        prefix: IdPrefix,
        #[source]
        source: DbError,
    },
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;

/// Read access to the highest patient id of a bucket.
pub trait PatientIdLookup {
    /// Greatest id in allocation order that starts with `prefix`, if any.
    fn max_patient_id_with_prefix(&self, prefix: &IdPrefix) -> DbResult<Option<String>>;
}

impl<F> PatientIdLookup for F
where
    F: Fn(&IdPrefix) -> DbResult<Option<String>>,
{
    fn max_patient_id_with_prefix(&self, prefix: &IdPrefix) -> DbResult<Option<String>> {
        self(prefix)
    }
}

impl PatientIdLookup for Database {
    fn max_patient_id_with_prefix(&self, prefix: &IdPrefix) -> DbResult<Option<String>> {
        db::max_patient_id_with_prefix(self.conn(), prefix)
    }
}

/// Computes the next patient id for a signup.
///
/// Holds no per-bucket state; every call reads the bucket maximum through a
/// [`PatientIdLookup`]. The returned id is only reserved once the caller has
/// inserted it.
#[derive(Debug, Clone, Default)]
pub struct PatientIdAllocator {
    countries: CountryCodeResolver,
    /// Overrides the current UTC year (backfills, tests)
    fixed_year: Option<i32>,
}

impl PatientIdAllocator {
    /// Create an allocator using the built-in country table and the current year.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom country table.
    pub fn with_countries(mut self, countries: CountryCodeResolver) -> Self {
        self.countries = countries;
        self
    }

    /// Pin the year used for prefixes.
    pub fn with_fixed_year(mut self, year: i32) -> Self {
        self.fixed_year = Some(year);
        self
    }

    /// Year used for the next prefix.
    pub fn year(&self) -> i32 {
        self.fixed_year
            .unwrap_or_else(|| chrono::Utc::now().year())
    }

    pub fn countries(&self) -> &CountryCodeResolver {
        &self.countries
    }

    /// Bucket key for a signup from `country_name`.
    pub fn prefix_for(&self, country_name: &str) -> IdPrefix {
        IdPrefix::new(self.year(), &self.countries.resolve(country_name))
    }

    /// Generate the next patient id for `country_name`.
    ///
    /// A failed lookup is returned as an error; no id is made up without
    /// knowing the bucket maximum.
    pub fn generate<L>(&self, country_name: &str, lookup: &L) -> AllocatorResult<PatientId>
    where
        L: PatientIdLookup + ?Sized,
    {
        self.generate_in(&self.prefix_for(country_name), lookup)
    }

    /// Generate the next patient id in an already derived bucket.
    pub fn generate_in<L>(&self, prefix: &IdPrefix, lookup: &L) -> AllocatorResult<PatientId>
    where
        L: PatientIdLookup + ?Sized,
    {
        let current = lookup
            .max_patient_id_with_prefix(prefix)
            .map_err(|source| AllocatorError::LookupFailed {
                prefix: prefix.clone(),
                source,
            })?;

        let id = Self::next_after(prefix, current.as_deref());
        tracing::debug!(
            prefix = %prefix,
            current = ?current,
            next = %id,
            "Allocated patient id"
        );
        Ok(id)
    }

    /// The id that follows `current` in `prefix`, or the seed for an empty bucket.
    pub fn next_after(prefix: &IdPrefix, current: Option<&str>) -> PatientId {
        match current {
            Some(current) => increment(current, prefix),
            None => prefix.seed(),
        }
    }
}
