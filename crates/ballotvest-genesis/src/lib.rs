//! ballotvest-genesis
//!
//! Builds the initial ledger state in an empty `StateDb`, writing directly
//! into the store without going through the step engine.
//!
//! Genesis records:
//!
//! 1. The owner and the ledger parameters
//! 2. The admin set: the reward pool plus any configured admins
//! 3. Initial token balances in the built-in token
//!
//! All three are written in a single commit. This is the only place tokens
//! are created.

pub mod params;

use std::collections::BTreeMap;

pub use params::{resolve_account, GenesisParams};

use ballotvest_core::constants::{META_OWNER, META_PARAMS};
use ballotvest_core::error::BallotvestError;
use ballotvest_core::types::{Address, Balance};
use ballotvest_state::db::encode;
use ballotvest_state::{StateDb, Table, WriteSet};
use tracing::info;

/// Accounts fixed at genesis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisAccounts {
    pub owner: Address,
    /// Funds rewards and acts as the distributor when elections finalize.
    pub reward_pool: Address,
    /// Holds tokens owed to vesting beneficiaries.
    pub vesting_custody: Address,
}

/// Apply the genesis state to an empty `StateDb`.
///
/// Fails with `GenesisAlreadyApplied` if the store already has an owner.
pub fn apply_genesis(db: &StateDb, params: &GenesisParams) -> Result<GenesisAccounts, BallotvestError> {
    if db.is_initialised()? {
        return Err(BallotvestError::GenesisAlreadyApplied);
    }
    info!("applying ballotvest genesis state");

    let ledger = params.ledger_params()?;
    let owner = resolve_account(&params.owner)?;
    if owner.is_zero() {
        return Err(BallotvestError::ZeroAddress);
    }

    let mut admins = vec![ledger.reward_pool];
    for reference in &params.admins {
        let admin = resolve_account(reference)?;
        if admin.is_zero() {
            return Err(BallotvestError::ZeroAddress);
        }
        admins.push(admin);
    }

    // Several references may name the same account; their amounts add up.
    let mut balances: BTreeMap<Address, Balance> = BTreeMap::new();
    for (reference, amount) in &params.balances {
        let holder = resolve_account(reference)?;
        if holder.is_zero() {
            return Err(BallotvestError::ZeroAddress);
        }
        if *amount == 0 {
            return Err(BallotvestError::ZeroAmount);
        }
        let entry = balances.entry(holder).or_insert(0);
        *entry = entry
            .checked_add(*amount)
            .ok_or_else(|| BallotvestError::InvalidParams(format!("initial balance overflow for {holder}")))?;
    }
    let supply = balances
        .values()
        .try_fold(0 as Balance, |acc, b| acc.checked_add(*b))
        .ok_or_else(|| BallotvestError::InvalidParams("initial supply overflows".into()))?;

    // ── 1. Owner, parameters, admins and balances in one commit ─────────────
    let mut w = WriteSet::default();
    w.put(Table::Meta, META_OWNER, encode(&owner)?);
    w.put(Table::Meta, META_PARAMS, encode(&ledger)?);
    for admin in &admins {
        w.put(Table::Admins, admin.as_bytes().to_vec(), Vec::new());
    }
    for (holder, amount) in &balances {
        w.put_balance(holder, *amount);
    }
    let undo = db.commit(&w)?;
    info!(%owner, admins = admins.len(), holders = balances.len(), "genesis: state recorded");

    let accounts = GenesisAccounts {
        owner,
        reward_pool: ledger.reward_pool,
        vesting_custody: ledger.vesting_custody,
    };

    // ── 2. Verify ────────────────────────────────────────────────────────────
    if let Err(e) = verify_genesis(db, &accounts, &balances, supply) {
        db.commit(&undo)?;
        return Err(e);
    }

    db.flush()?;
    info!("genesis state committed to disk");
    Ok(accounts)
}

/// Read the genesis state back and check it matches what was requested.
fn verify_genesis(
    db: &StateDb,
    accounts: &GenesisAccounts,
    balances: &BTreeMap<Address, Balance>,
    expected: Balance,
) -> Result<(), BallotvestError> {
    if db.get_owner()? != Some(accounts.owner) {
        return Err(BallotvestError::Storage("genesis owner not persisted".into()));
    }
    if !db.is_admin(&accounts.reward_pool)? {
        return Err(BallotvestError::Storage("reward pool is not an admin".into()));
    }

    let mut total: Balance = 0;
    for holder in balances.keys() {
        total = total.saturating_add(db.token_balance(holder)?);
    }
    if total != expected {
        return Err(BallotvestError::Storage(format!(
            "genesis supply mismatch: expected {expected}, got {total}"
        )));
    }

    info!(total_supply = total, "genesis supply verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballotvest_core::params::LedgerParams;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("ballotvest_genesis_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    #[test]
    fn template_genesis_applies() {
        let db = temp_db("template");
        let params = GenesisParams::template();
        let accounts = apply_genesis(&db, &params).expect("genesis must succeed");

        assert_eq!(accounts.owner, Address::derive("owner"));
        assert_eq!(db.get_owner().unwrap(), Some(accounts.owner));
        assert!(db.is_admin(&accounts.reward_pool).unwrap());
        assert!(!db.is_admin(&accounts.owner).unwrap());
        assert_eq!(db.get_params().unwrap(), Some(params.ledger_params().unwrap()));

        assert_eq!(db.token_balance(&accounts.reward_pool).unwrap(), params.balances["reward-pool"]);
        assert_eq!(db.token_balance(&Address::derive("alice")).unwrap(), params.balances["@alice"]);
        assert_eq!(db.token_balance(&accounts.vesting_custody).unwrap(), 0);
    }

    #[test]
    fn genesis_applies_once() {
        let db = temp_db("twice");
        let params = GenesisParams::template();
        apply_genesis(&db, &params).unwrap();
        let err = apply_genesis(&db, &params).unwrap_err();
        assert!(matches!(err, BallotvestError::GenesisAlreadyApplied));
        assert_eq!(
            db.token_balance(&LedgerParams::default().reward_pool).unwrap(),
            params.balances["reward-pool"]
        );
    }

    #[test]
    fn extra_admins_recorded() {
        let db = temp_db("admins");
        let params = GenesisParams {
            admins: vec!["@ops".into()],
            ..GenesisParams::template()
        };
        apply_genesis(&db, &params).unwrap();
        let mut expected = vec![LedgerParams::default().reward_pool, Address::derive("ops")];
        expected.sort();
        let mut admins = db.get_admins().unwrap();
        admins.sort();
        assert_eq!(admins, expected);
    }

    #[test]
    fn invalid_params_leave_store_empty() {
        let db = temp_db("invalid");
        let mut params = GenesisParams::template();
        params.balances.insert("@carol".into(), 0);
        assert!(matches!(apply_genesis(&db, &params), Err(BallotvestError::ZeroAmount)));
        assert!(!db.is_initialised().unwrap());

        let bad_owner = GenesisParams { owner: "nope!".into(), ..GenesisParams::template() };
        assert!(matches!(apply_genesis(&db, &bad_owner), Err(BallotvestError::InvalidAddress(_))));
        assert!(!db.is_initialised().unwrap());
    }

    #[test]
    fn same_account_named_twice_adds_up() {
        let db = temp_db("aliases");
        let x = Address::derive("x");
        let mut params = GenesisParams::template();
        params.balances.insert("@x".into(), 5);
        params.balances.insert(x.to_b58(), 7);
        apply_genesis(&db, &params).unwrap();
        assert_eq!(db.token_balance(&x).unwrap(), 12);
    }

    #[test]
    fn overflowing_balances_leave_store_retryable() {
        let db = temp_db("overflow");
        let x = Address::derive("x");
        let mut params = GenesisParams::template();
        params.balances.insert("@x".into(), Balance::MAX);
        params.balances.insert(x.to_b58(), 1);

        let err = apply_genesis(&db, &params).unwrap_err();
        assert!(matches!(err, BallotvestError::InvalidParams(_)));
        assert!(!db.is_initialised().unwrap());
        assert_eq!(db.token_balance(&x).unwrap(), 0);
        assert_eq!(db.token_balance(&LedgerParams::default().reward_pool).unwrap(), 0);

        let accounts = apply_genesis(&db, &GenesisParams::template()).unwrap();
        assert_eq!(db.get_owner().unwrap(), Some(accounts.owner));
    }

    #[test]
    fn supply_overflow_across_holders_rejected() {
        let db = temp_db("supply_overflow");
        let mut params = GenesisParams::template();
        params.balances.insert("@x".into(), Balance::MAX);
        assert!(matches!(apply_genesis(&db, &params), Err(BallotvestError::InvalidParams(_))));
        assert!(!db.is_initialised().unwrap());
    }
}
