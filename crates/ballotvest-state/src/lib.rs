//! ballotvest-state
//!
//! Persistent state and the step engine. Each public operation runs as one
//! atomic step: components validate and stage their changes, the engine
//! commits them in a single store transaction, then issues token transfers,
//! undoing everything if a transfer fails.

pub mod access;
pub mod db;
pub mod distributor;
pub mod engine;
pub mod registry;
pub mod token;
pub mod vesting;

pub use access::AccessControl;
pub use db::{StateDb, Table, WriteSet};
pub use engine::StateEngine;
pub use registry::ElectionRegistry;
pub use token::{TokenLedger, Transfer};
pub use vesting::VestingLedger;
