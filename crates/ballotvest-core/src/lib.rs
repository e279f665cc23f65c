pub mod action;
pub mod constants;
pub mod election;
pub mod error;
pub mod event;
pub mod params;
pub mod types;
pub mod vesting;

pub use action::*;
pub use constants::*;
pub use election::*;
pub use error::{BallotvestError, ErrorKind};
pub use event::*;
pub use params::LedgerParams;
pub use types::*;
pub use vesting::*;
