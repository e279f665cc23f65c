use serde::{Deserialize, Serialize};

use crate::types::{Address, Balance, ElectionId, Timestamp};

// ── Action ───────────────────────────────────────────────────────────────────

/// Every state-changing operation is one of these variants.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    // ── Access control ───────────────────────────────────────────────────────

    /// Grant or revoke admin rights. Owner only.
    SetAdmin {
        account: Address,
        authorized: bool,
    },

    // ── Elections ────────────────────────────────────────────────────────────

    /// Register the caller as a voter. Gated on the caller's token balance.
    RegisterVoter,

    /// Open a new election. Owner only.
    CreateElection {
        name: String,
        candidate_names: Vec<String>,
        candidate_addresses: Vec<Address>,
        start_time: Timestamp,
        end_time: Timestamp,
    },

    Vote {
        election_id: ElectionId,
        candidate_index: usize,
    },

    /// Close an ended election and pay its winners into vesting. Owner only.
    Finalize {
        election_id: ElectionId,
    },

    // ── Vesting ──────────────────────────────────────────────────────────────

    /// Create a schedule directly. Owner or admin.
    AddVesting {
        beneficiary: Address,
        amount: Balance,
    },

    /// Withdraw everything unlocked so far.
    Claim,
}

/// An action together with the address that issued it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Call {
    pub caller: Address,
    pub action: Action,
}

impl Call {
    pub fn new(caller: Address, action: Action) -> Self {
        Self { caller, action }
    }
}
