//! spendpilot: a weekly marketing-spend analytics and decision engine.
//!
//! The engine turns raw weekly performance rows into comparative
//! analytics (rank, percentile, momentum, trend consistency), selects
//! a qualitative action per entity through an explicit rule cascade,
//! converts each action into a bounded numeric change and restores the
//! portfolio budget total by proportional rebalancing. An external
//! advisory model can optionally overlay qualitative labels; the
//! numeric layer stays fully deterministic either way.

pub mod advisor;
pub mod analytics;
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod data;
pub mod decision;
pub mod engine;
pub mod error;
pub mod execution;
