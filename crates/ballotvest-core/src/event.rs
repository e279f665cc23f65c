use serde::{Deserialize, Serialize};

use crate::types::{Address, Balance, ElectionId, Timestamp};

/// Observable record of a committed state change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    ElectionCreated {
        id: ElectionId,
        name: String,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    VoterRegistered {
        voter: Address,
    },
    VoteCast {
        election_id: ElectionId,
        voter: Address,
        candidate_index: usize,
    },
    ElectionFinalized {
        election_id: ElectionId,
    },
    RewardDistributed {
        election_id: ElectionId,
        reward_per_winner: Balance,
    },
    VestingAdded {
        beneficiary: Address,
        amount: Balance,
        start_time: Timestamp,
        duration_periods: u64,
    },
    TokensClaimed {
        beneficiary: Address,
        amount: Balance,
    },
    AdminUpdated {
        account: Address,
        authorized: bool,
    },
}

/// An event as persisted in the append-only log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    /// Gap-free, starting at 0.
    pub seq: u64,
    pub timestamp: Timestamp,
    pub event: Event,
}
