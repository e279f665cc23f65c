use ballotvest_core::constants::{META_NEXT_ELECTION_ID, META_NEXT_EVENT_SEQ, META_OWNER, META_PARAMS};
use ballotvest_core::election::Election;
use ballotvest_core::error::BallotvestError;
use ballotvest_core::event::EventRecord;
use ballotvest_core::params::LedgerParams;
use ballotvest_core::types::{Address, Balance, ElectionId};
use ballotvest_core::vesting::VestingSchedule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{IVec, Transactional};
use std::path::Path;

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   elections : ElectionId BE bytes → bincode(Election)
///   voters    : Address bytes       → [] (registered voter set)
///   schedules : Address bytes       → bincode(VestingSchedule)
///   admins    : Address bytes       → [] (authorized admin set)
///   events    : seq BE bytes        → bincode(EventRecord)
///   meta      : utf8 key bytes      → bincode value
///   balances  : Address bytes       → u128 BE bytes (built-in token)
pub struct StateDb {
    _db: sled::Db,
    elections: sled::Tree,
    voters: sled::Tree,
    schedules: sled::Tree,
    admins: sled::Tree,
    events: sled::Tree,
    meta: sled::Tree,
    balances: sled::Tree,
}

// ── Write sets ────────────────────────────────────────────────────────────────

/// Trees a [`WriteSet`] may touch. Steps never write `Balances` directly;
/// only genesis seeds it, and transfers go through the token ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    Elections,
    Voters,
    Schedules,
    Admins,
    Events,
    Meta,
    Balances,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Write {
    table: Table,
    key: Vec<u8>,
    /// `None` removes the key.
    value: Option<Vec<u8>>,
}

/// Ordered raw writes applied together by [`StateDb::commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: Vec<Write>,
}

impl WriteSet {
    pub fn put(&mut self, table: Table, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.writes.push(Write { table, key: key.into(), value: Some(value) });
    }

    pub fn delete(&mut self, table: Table, key: impl Into<Vec<u8>>) {
        self.writes.push(Write { table, key: key.into(), value: None });
    }

    /// Set `holder`'s balance outright, replacing any previous value.
    pub fn put_balance(&mut self, holder: &Address, amount: Balance) {
        self.put(Table::Balances, holder.as_bytes().to_vec(), amount.to_be_bytes().to_vec());
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

// ── Encoding helpers ──────────────────────────────────────────────────────────

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, BallotvestError> {
    bincode::serialize(value).map_err(|e| BallotvestError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BallotvestError> {
    bincode::deserialize(bytes).map_err(|e| BallotvestError::Serialization(e.to_string()))
}

fn storage(e: sled::Error) -> BallotvestError {
    BallotvestError::Storage(e.to_string())
}

pub fn election_key(id: ElectionId) -> [u8; 8] {
    id.to_be_bytes()
}

fn decode_balance(bytes: Option<IVec>) -> Option<Balance> {
    match bytes {
        None => Some(0),
        Some(b) => <[u8; 16]>::try_from(&b[..]).ok().map(Balance::from_be_bytes),
    }
}

/// Reasons a balance transaction aborts.
#[derive(Debug)]
enum BalanceAbort {
    Insufficient(Balance),
    Overflow,
    Corrupt,
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BallotvestError> {
        let db = sled::open(path).map_err(storage)?;
        let elections = db.open_tree("elections").map_err(storage)?;
        let voters    = db.open_tree("voters").map_err(storage)?;
        let schedules = db.open_tree("schedules").map_err(storage)?;
        let admins    = db.open_tree("admins").map_err(storage)?;
        let events    = db.open_tree("events").map_err(storage)?;
        let meta      = db.open_tree("meta").map_err(storage)?;
        let balances  = db.open_tree("balances").map_err(storage)?;
        Ok(Self { _db: db, elections, voters, schedules, admins, events, meta, balances })
    }

    fn tree(&self, table: Table) -> &sled::Tree {
        match table {
            Table::Elections => &self.elections,
            Table::Voters => &self.voters,
            Table::Schedules => &self.schedules,
            Table::Admins => &self.admins,
            Table::Events => &self.events,
            Table::Meta => &self.meta,
            Table::Balances => &self.balances,
        }
    }

    // ── Commit ────────────────────────────────────────────────────────────────

    /// Apply every write in one multi-tree transaction. Returns the write set
    /// that restores the previous values.
    pub fn commit(&self, set: &WriteSet) -> Result<WriteSet, BallotvestError> {
        let mut undo = WriteSet::default();
        if set.is_empty() {
            return Ok(undo);
        }
        for w in &set.writes {
            let prev = self.tree(w.table).get(&w.key).map_err(storage)?;
            undo.writes.push(Write {
                table: w.table,
                key: w.key.clone(),
                value: prev.map(|v| v.to_vec()),
            });
        }

        (&self.elections, &self.voters, &self.schedules, &self.admins, &self.events, &self.meta, &self.balances)
            .transaction(|(elections, voters, schedules, admins, events, meta, balances)| {
                for w in &set.writes {
                    let tree = match w.table {
                        Table::Elections => elections,
                        Table::Voters => voters,
                        Table::Schedules => schedules,
                        Table::Admins => admins,
                        Table::Events => events,
                        Table::Meta => meta,
                        Table::Balances => balances,
                    };
                    match &w.value {
                        Some(v) => {
                            tree.insert(w.key.as_slice(), v.as_slice())?;
                        }
                        None => {
                            tree.remove(w.key.as_slice())?;
                        }
                    }
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e: TransactionError<()>| match e {
                TransactionError::Abort(()) => BallotvestError::Storage("commit aborted".into()),
                TransactionError::Storage(err) => storage(err),
            })?;

        Ok(undo)
    }

    // ── Elections ─────────────────────────────────────────────────────────────

    pub fn get_election(&self, id: ElectionId) -> Result<Option<Election>, BallotvestError> {
        match self.elections.get(election_key(id)).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn next_election_id(&self) -> Result<ElectionId, BallotvestError> {
        Ok(self.get_meta(META_NEXT_ELECTION_ID)?.unwrap_or(0))
    }

    pub fn iter_elections(&self) -> Result<Vec<Election>, BallotvestError> {
        let mut out = Vec::new();
        for item in self.elections.iter() {
            let (_, bytes) = item.map_err(storage)?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // ── Voter registry ────────────────────────────────────────────────────────

    pub fn is_registered(&self, voter: &Address) -> Result<bool, BallotvestError> {
        self.voters.contains_key(voter.as_bytes()).map_err(storage)
    }

    // ── Vesting schedules ─────────────────────────────────────────────────────

    pub fn get_schedule(&self, beneficiary: &Address) -> Result<Option<VestingSchedule>, BallotvestError> {
        match self.schedules.get(beneficiary.as_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn iter_schedules(&self) -> Result<Vec<VestingSchedule>, BallotvestError> {
        let mut out = Vec::new();
        for item in self.schedules.iter() {
            let (_, bytes) = item.map_err(storage)?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // ── Access control ────────────────────────────────────────────────────────

    pub fn get_owner(&self) -> Result<Option<Address>, BallotvestError> {
        self.get_meta(META_OWNER)
    }

    pub fn is_admin(&self, account: &Address) -> Result<bool, BallotvestError> {
        self.admins.contains_key(account.as_bytes()).map_err(storage)
    }

    pub fn get_admins(&self) -> Result<Vec<Address>, BallotvestError> {
        let mut out = Vec::new();
        for item in self.admins.iter() {
            let (key, _) = item.map_err(storage)?;
            out.push(Address::from_slice(&key)?);
        }
        Ok(out)
    }

    // ── Params ────────────────────────────────────────────────────────────────

    pub fn get_params(&self) -> Result<Option<LedgerParams>, BallotvestError> {
        self.get_meta(META_PARAMS)
    }

    pub fn is_initialised(&self) -> Result<bool, BallotvestError> {
        self.meta.contains_key(META_OWNER.as_bytes()).map_err(storage)
    }

    // ── Events ────────────────────────────────────────────────────────────────

    pub fn next_event_seq(&self) -> Result<u64, BallotvestError> {
        Ok(self.get_meta(META_NEXT_EVENT_SEQ)?.unwrap_or(0))
    }

    pub fn iter_events(&self) -> Result<Vec<EventRecord>, BallotvestError> {
        let mut out = Vec::new();
        for item in self.events.iter() {
            let (_, bytes) = item.map_err(storage)?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // ── Meta ──────────────────────────────────────────────────────────────────

    pub fn get_meta<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BallotvestError> {
        match self.meta.get(key.as_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Balances ──────────────────────────────────────────────────────────────

    pub fn token_balance(&self, holder: &Address) -> Result<Balance, BallotvestError> {
        let bytes = self.balances.get(holder.as_bytes()).map_err(storage)?;
        decode_balance(bytes)
            .ok_or_else(|| BallotvestError::Serialization(format!("corrupt balance for {holder}")))
    }

    /// Credit `amount` to `holder` outside any step.
    pub fn mint(&self, holder: &Address, amount: Balance) -> Result<(), BallotvestError> {
        let have = self.token_balance(holder)?;
        let new = have
            .checked_add(amount)
            .ok_or_else(|| BallotvestError::TransferRejected(format!("balance overflow for {holder}")))?;
        self.balances
            .insert(holder.as_bytes(), new.to_be_bytes().to_vec())
            .map_err(storage)?;
        Ok(())
    }

    /// Move tokens between two balances in one transaction.
    pub(crate) fn move_tokens(&self, from: &Address, to: &Address, amount: Balance) -> Result<(), BallotvestError> {
        let from_key: &[u8] = &from.as_bytes()[..];
        let to_key: &[u8] = &to.as_bytes()[..];
        self.balances
            .transaction(|tx| {
                let have = decode_balance(tx.get(from_key)?)
                    .ok_or(ConflictableTransactionError::Abort(BalanceAbort::Corrupt))?;
                if have < amount {
                    return Err(ConflictableTransactionError::Abort(BalanceAbort::Insufficient(have)));
                }
                if from == to {
                    return Ok(());
                }
                let dest = decode_balance(tx.get(to_key)?)
                    .ok_or(ConflictableTransactionError::Abort(BalanceAbort::Corrupt))?;
                let credited = dest
                    .checked_add(amount)
                    .ok_or(ConflictableTransactionError::Abort(BalanceAbort::Overflow))?;
                tx.insert(from_key, (have - amount).to_be_bytes().to_vec())?;
                tx.insert(to_key, credited.to_be_bytes().to_vec())?;
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(BalanceAbort::Insufficient(have)) => BallotvestError::InsufficientTokens {
                    holder: from.to_string(),
                    need: amount,
                    have,
                },
                TransactionError::Abort(BalanceAbort::Overflow) => {
                    BallotvestError::TransferRejected(format!("balance overflow for {to}"))
                }
                TransactionError::Abort(BalanceAbort::Corrupt) => {
                    BallotvestError::Serialization("corrupt balance entry".into())
                }
                TransactionError::Storage(err) => storage(err),
            })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), BallotvestError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}
