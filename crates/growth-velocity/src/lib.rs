//! WHO 2006 growth-velocity classification for child-health records.
//!
//! The engine decides whether the weight or length gained between two visits is adequate,
//! inadequate, or excessive for the child's age, sex, and the time elapsed between visits.
//! Reference tables ship with the crate as CSV data and are validated when loaded.

pub mod config;
pub mod error;
pub mod growth;
pub mod telemetry;
