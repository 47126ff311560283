//! Domain models for patient registration.

mod patient;
mod signup;

pub use patient::*;
pub use signup::*;
