//! Turning decisions into adjusted rows.
//!
//! - [`executor`]: applies a decision set to the current snapshot and
//!   rolls the adjusted rows into next week's baseline.
//! - [`rebalance`]: portfolio-total neutrality and per-entity floors.

pub mod executor;
pub mod rebalance;
