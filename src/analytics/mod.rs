//! Comparative analytics over weekly performance rows.
//!
//! The submodules form the first half of the weekly pipeline:
//!
//! - [`trend`]: per-entity momentum, rolling average, volatility and
//!   consistency classification.
//! - [`ranking`]: cross-sectional rank/percentile assignment and the
//!   audience composite health score.
//! - [`enrich`]: joins trend and rank into per-entity enriched copies
//!   of the period snapshot.
//! - [`portfolio`]: the week-level statistics and movers summary.

pub mod enrich;
pub mod portfolio;
pub mod ranking;
pub mod trend;
