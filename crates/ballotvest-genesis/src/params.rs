use std::collections::BTreeMap;

use ballotvest_core::constants::{
    DEFAULT_PERIOD_SECS, DEFAULT_REQUIRED_TOKEN_BALANCE, DEFAULT_TOTAL_REWARD_AMOUNT,
};
use ballotvest_core::error::BallotvestError;
use ballotvest_core::params::LedgerParams;
use ballotvest_core::types::{Address, Balance};
use serde::{Deserialize, Serialize};

/// Keyword naming the reward pool in account references.
pub const REWARD_POOL_REF: &str = "reward-pool";
/// Keyword naming the vesting custody account in account references.
pub const VESTING_CUSTODY_REF: &str = "vesting-custody";

/// Resolve an account reference.
///
/// Accepts `reward-pool`, `vesting-custody`, `@label` (an address derived
/// from the label) or a literal base-58 / `0x` hex address.
pub fn resolve_account(reference: &str) -> Result<Address, BallotvestError> {
    let defaults = LedgerParams::default();
    match reference {
        REWARD_POOL_REF => Ok(defaults.reward_pool),
        VESTING_CUSTODY_REF => Ok(defaults.vesting_custody),
        _ => match reference.strip_prefix('@') {
            Some(label) if !label.is_empty() => Ok(Address::derive(label)),
            Some(_) => Err(BallotvestError::InvalidAddress("empty label".into())),
            None => reference.parse(),
        },
    }
}

/// Deployment parameters read from a JSON file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenesisParams {
    /// Account reference of the contract owner.
    pub owner: String,
    #[serde(default = "default_required_token_balance")]
    pub required_token_balance: Balance,
    #[serde(default = "default_total_reward_amount")]
    pub total_reward_amount: Balance,
    #[serde(default = "default_period_secs")]
    pub period_secs: i64,
    /// Admins besides the reward pool, which is always one.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Initial token balances keyed by account reference.
    #[serde(default)]
    pub balances: BTreeMap<String, Balance>,
}

fn default_required_token_balance() -> Balance {
    DEFAULT_REQUIRED_TOKEN_BALANCE
}

fn default_total_reward_amount() -> Balance {
    DEFAULT_TOTAL_REWARD_AMOUNT
}

fn default_period_secs() -> i64 {
    DEFAULT_PERIOD_SECS
}

impl GenesisParams {
    /// A starting point for `genesis-template`.
    pub fn template() -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(REWARD_POOL_REF.to_string(), 100 * DEFAULT_TOTAL_REWARD_AMOUNT);
        balances.insert("@alice".to_string(), 10 * DEFAULT_REQUIRED_TOKEN_BALANCE);
        balances.insert("@bob".to_string(), 10 * DEFAULT_REQUIRED_TOKEN_BALANCE);
        Self {
            owner: "@owner".into(),
            required_token_balance: DEFAULT_REQUIRED_TOKEN_BALANCE,
            total_reward_amount: DEFAULT_TOTAL_REWARD_AMOUNT,
            period_secs: DEFAULT_PERIOD_SECS,
            admins: Vec::new(),
            balances,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BallotvestError> {
        serde_json::from_str(json).map_err(|e| BallotvestError::InvalidParams(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, BallotvestError> {
        serde_json::to_string_pretty(self).map_err(|e| BallotvestError::Serialization(e.to_string()))
    }

    /// Ledger parameters with the standard system accounts.
    pub fn ledger_params(&self) -> Result<LedgerParams, BallotvestError> {
        let params = LedgerParams {
            required_token_balance: self.required_token_balance,
            total_reward_amount: self.total_reward_amount,
            period_secs: self.period_secs,
            ..LedgerParams::default()
        };
        params.validate()?;
        Ok(params)
    }
}
