//! The deterministic decision layer.
//!
//! - [`types`]: decision and adjustment records.
//! - [`rules`]: the ordered action cascade for campaigns and ad groups.
//! - [`audience`]: audience refinement and distribution balancing.
//! - [`magnitude`]: qualitative action to exact numeric change.

pub mod audience;
pub mod magnitude;
pub mod rules;
pub mod types;
