//! Runtime configuration from the environment.
//!
//! # Environment Variables
//! - `PORTAL_DATABASE_PATH`: SQLite database file (default: "portal.db")
//! - `PORTAL_MAX_ALLOCATION_ATTEMPTS`: attempts per signup before giving up (default: 5)
//! - `PORTAL_ID_YEAR`: pin the year used in patient id prefixes (default: current UTC year)
//!
//! A `.env` file in the working directory is loaded first when present.

use std::path::PathBuf;

use thiserror::Error;

use crate::id::PatientIdAllocator;
use crate::registration::DEFAULT_MAX_ATTEMPTS;

pub const DATABASE_PATH_VAR: &str = "PORTAL_DATABASE_PATH";
pub const MAX_ATTEMPTS_VAR: &str = "PORTAL_MAX_ALLOCATION_ATTEMPTS";
pub const ID_YEAR_VAR: &str = "PORTAL_ID_YEAR";

const DEFAULT_DATABASE_PATH: &str = "portal.db";

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Portal configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub database_path: PathBuf,
    pub max_allocation_attempts: u32,
    /// Year override for patient id prefixes
    pub fixed_year: Option<i32>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            max_allocation_attempts: DEFAULT_MAX_ATTEMPTS,
            fixed_year: None,
        }
    }
}

impl PortalConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DATABASE_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(MAX_ATTEMPTS_VAR) {
            let attempts: u32 = parse_var(MAX_ATTEMPTS_VAR, &raw)?;
            if attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    var: MAX_ATTEMPTS_VAR,
                    value: raw,
                    reason: "must be at least 1".into(),
                });
            }
            config.max_allocation_attempts = attempts;
        }

        if let Some(raw) = lookup(ID_YEAR_VAR) {
            config.fixed_year = Some(parse_var(ID_YEAR_VAR, &raw)?);
        }

        Ok(config)
    }

    /// Allocator honouring `fixed_year`.
    pub fn allocator(&self) -> PatientIdAllocator {
        match self.fixed_year {
            Some(year) => PatientIdAllocator::new().with_fixed_year(year),
            None => PatientIdAllocator::new(),
        }
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
