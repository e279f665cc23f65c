//! Fungible-token collaborator.
//!
//! The ledger never holds balances of its own accounting; it asks a
//! [`TokenLedger`] for balances and routes every payout through it.

use std::collections::HashMap;

use ballotvest_core::error::BallotvestError;
use ballotvest_core::types::{Address, Balance};

use crate::db::StateDb;

pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, holder: &Address) -> Result<Balance, BallotvestError>;

    /// Move `amount` from `from` to `to`. Must either complete or leave both
    /// balances untouched.
    fn transfer(&self, from: &Address, to: &Address, amount: Balance) -> Result<(), BallotvestError>;
}

/// Built-in token kept in the store's `balances` tree.
impl TokenLedger for StateDb {
    fn balance_of(&self, holder: &Address) -> Result<Balance, BallotvestError> {
        self.token_balance(holder)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Balance) -> Result<(), BallotvestError> {
        self.move_tokens(from, to, amount)
    }
}

/// A token movement planned during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: Balance,
}

impl Transfer {
    pub fn reversed(&self) -> Self {
        Self { from: self.to, to: self.from, amount: self.amount }
    }
}

// ── Projected balances ────────────────────────────────────────────────────────

/// Balances as they will be once the transfers staged so far have run.
/// Lets a step reject an underfunded transfer before anything is written.
pub(crate) struct TokenOverlay<'a> {
    token: &'a dyn TokenLedger,
    projected: HashMap<Address, Balance>,
}

impl<'a> TokenOverlay<'a> {
    pub fn new(token: &'a dyn TokenLedger) -> Self {
        Self { token, projected: HashMap::new() }
    }

    pub fn balance_of(&mut self, holder: &Address) -> Result<Balance, BallotvestError> {
        if let Some(b) = self.projected.get(holder) {
            return Ok(*b);
        }
        let b = self.token.balance_of(holder)?;
        self.projected.insert(*holder, b);
        Ok(b)
    }

    /// Record a transfer against the projected balances.
    pub fn plan(&mut self, transfer: &Transfer) -> Result<(), BallotvestError> {
        let have = self.balance_of(&transfer.from)?;
        if have < transfer.amount {
            return Err(BallotvestError::InsufficientTokens {
                holder: transfer.from.to_string(),
                need: transfer.amount,
                have,
            });
        }
        if transfer.from == transfer.to {
            return Ok(());
        }
        let dest = self.balance_of(&transfer.to)?;
        let credited = dest
            .checked_add(transfer.amount)
            .ok_or_else(|| BallotvestError::TransferRejected(format!("balance overflow for {}", transfer.to)))?;
        self.projected.insert(transfer.from, have - transfer.amount);
        self.projected.insert(transfer.to, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("ballotvest_token_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    #[test]
    fn overlay_tracks_successive_debits() {
        let db = temp_db("overlay");
        let pool = Address::derive("pool");
        let custody = Address::derive("custody");
        db.mint(&pool, 1_000).unwrap();

        let mut overlay = TokenOverlay::new(&db);
        let t = Transfer { from: pool, to: custody, amount: 600 };
        overlay.plan(&t).unwrap();
        let err = overlay.plan(&t).unwrap_err();
        assert!(matches!(err, BallotvestError::InsufficientTokens { need: 600, have: 400, .. }));
        assert_eq!(overlay.balance_of(&custody).unwrap(), 600);

        // Nothing moved for real.
        assert_eq!(db.balance_of(&pool).unwrap(), 1_000);
    }

    #[test]
    fn reversed_swaps_endpoints() {
        let t = Transfer { from: Address::derive("a"), to: Address::derive("b"), amount: 3 };
        let r = t.reversed();
        assert_eq!((r.from, r.to, r.amount), (t.to, t.from, 3));
    }
}
