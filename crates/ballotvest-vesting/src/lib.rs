//! ballotvest-vesting
//!
//! Query and reporting layer for vesting schedules.
//! Creating and claiming schedules happens in ballotvest-state's StateEngine.
//! This crate computes per-period unlock timelines and renders
//! human-readable summaries.

pub mod query;
pub mod schedule;

pub use query::VestingQuery;
pub use schedule::{unlock_timeline, UnlockStep};
