use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PERIOD_SECS, DEFAULT_REQUIRED_TOKEN_BALANCE, DEFAULT_TOTAL_REWARD_AMOUNT,
    REWARD_POOL_LABEL, VESTING_CUSTODY_LABEL,
};
use crate::error::BallotvestError;
use crate::types::{Address, Balance};

/// Deployment parameters, fixed at genesis.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerParams {
    /// Minimum token balance needed to register as a voter.
    pub required_token_balance: Balance,
    /// Reward split among the winners of each finalized election.
    pub total_reward_amount: Balance,
    /// Length of one unlock period in seconds.
    pub period_secs: i64,
    /// Holds undistributed rewards; identity of the reward distributor.
    pub reward_pool: Address,
    /// Holds vested tokens until their beneficiaries claim them.
    pub vesting_custody: Address,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            required_token_balance: DEFAULT_REQUIRED_TOKEN_BALANCE,
            total_reward_amount: DEFAULT_TOTAL_REWARD_AMOUNT,
            period_secs: DEFAULT_PERIOD_SECS,
            reward_pool: Address::derive(REWARD_POOL_LABEL),
            vesting_custody: Address::derive(VESTING_CUSTODY_LABEL),
        }
    }
}

impl LedgerParams {
    pub fn validate(&self) -> Result<(), BallotvestError> {
        if self.period_secs <= 0 {
            return Err(BallotvestError::InvalidParams("period_secs must be positive".into()));
        }
        if self.reward_pool.is_zero() || self.vesting_custody.is_zero() {
            return Err(BallotvestError::InvalidParams("system accounts must not be zero".into()));
        }
        if self.reward_pool == self.vesting_custody {
            return Err(BallotvestError::InvalidParams(
                "reward pool and vesting custody must differ".into(),
            ));
        }
        Ok(())
    }
}
