//! Shared row types, records and numeric helpers.

pub mod math;
pub mod types;
