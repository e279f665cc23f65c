use std::sync::Arc;

use ballotvest_core::action::{Action, Call};
use ballotvest_core::constants::{META_NEXT_ELECTION_ID, META_NEXT_EVENT_SEQ};
use ballotvest_core::election::{Candidate, Election};
use ballotvest_core::error::BallotvestError;
use ballotvest_core::event::{Event, EventRecord};
use ballotvest_core::params::LedgerParams;
use ballotvest_core::types::{Address, Balance, ElectionId, Timestamp};
use ballotvest_core::vesting::{VestingInfo, VestingSchedule};
use tracing::{error, info, warn};

use crate::access::{self, AccessControl};
use crate::db::{election_key, encode, StateDb, Table, WriteSet};
use crate::distributor;
use crate::registry::{self, ElectionRegistry};
use crate::token::{TokenLedger, TokenOverlay, Transfer};
use crate::vesting::{self, VestingLedger};

// ── Staged mutations ──────────────────────────────────────────────────────────

/// All state changes staged by one call before atomic commit.
#[derive(Default)]
pub(crate) struct StagedMutations {
    pub elections: Vec<Election>,
    pub voters: Vec<Address>,
    pub schedules: Vec<VestingSchedule>,
    pub admins: Vec<(Address, bool)>,
    pub next_election_id: Option<ElectionId>,
    pub transfers: Vec<Transfer>,
    pub events: Vec<Event>,
}

/// Context handed to the components while a call is being staged.
pub(crate) struct Step<'a> {
    pub db: &'a StateDb,
    pub params: &'a LedgerParams,
    pub now: Timestamp,
    pub tokens: TokenOverlay<'a>,
    pub staged: StagedMutations,
}

impl<'a> Step<'a> {
    fn new(db: &'a StateDb, params: &'a LedgerParams, now: Timestamp, token: &'a dyn TokenLedger) -> Self {
        Self {
            db,
            params,
            now,
            tokens: TokenOverlay::new(token),
            staged: StagedMutations::default(),
        }
    }

    /// Latest staged copy of an election, else the stored one.
    pub fn election(&self, id: ElectionId) -> Result<Election, BallotvestError> {
        if let Some(e) = self.staged.elections.iter().rev().find(|e| e.id == id) {
            return Ok(e.clone());
        }
        self.db.get_election(id)?.ok_or(BallotvestError::ElectionNotFound(id))
    }

    /// Latest staged copy of a schedule, else the stored one.
    pub fn schedule(&self, beneficiary: &Address) -> Result<Option<VestingSchedule>, BallotvestError> {
        if let Some(s) = self.staged.schedules.iter().rev().find(|s| s.beneficiary == *beneficiary) {
            return Ok(Some(s.clone()));
        }
        self.db.get_schedule(beneficiary)
    }

    /// Check a transfer against projected balances and queue it.
    pub fn stage_transfer(&mut self, transfer: Transfer) -> Result<(), BallotvestError> {
        self.tokens.plan(&transfer)?;
        self.staged.transfers.push(transfer);
        Ok(())
    }

    pub fn emit(&mut self, event: Event) {
        self.staged.events.push(event);
    }
}

// ── StateEngine ───────────────────────────────────────────────────────────────

/// The state transition engine.
///
/// Each `apply` call is atomic: either every effect of the call persists or
/// none does. State is committed before token transfers are issued; a failed
/// transfer reverses the transfers already made and restores the previous
/// state.
pub struct StateEngine {
    pub db: Arc<StateDb>,
    token: Arc<dyn TokenLedger>,
    params: LedgerParams,
}

impl StateEngine {
    pub fn new(db: Arc<StateDb>, token: Arc<dyn TokenLedger>, params: LedgerParams) -> Self {
        Self { db, token, params }
    }

    /// Engine over an initialised store, using the store's built-in token.
    pub fn open(db: Arc<StateDb>) -> Result<Self, BallotvestError> {
        let token: Arc<dyn TokenLedger> = db.clone();
        Self::with_token(db, token)
    }

    /// Engine over an initialised store with an external token.
    pub fn with_token(db: Arc<StateDb>, token: Arc<dyn TokenLedger>) -> Result<Self, BallotvestError> {
        let params = db.get_params()?.ok_or(BallotvestError::NotInitialised)?;
        Ok(Self::new(db, token, params))
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn token(&self) -> &dyn TokenLedger {
        self.token.as_ref()
    }

    /// Validate and apply one call. Returns the events it emitted.
    pub fn apply(&self, call: &Call, now: Timestamp) -> Result<Vec<Event>, BallotvestError> {
        let mut step = Step::new(&self.db, &self.params, now, self.token.as_ref());
        if let Err(e) = dispatch(&mut step, call) {
            warn!(caller = %call.caller, error = %e, "call rejected");
            return Err(e);
        }
        let staged = step.staged;

        // ── Commit ────────────────────────────────────────────────────────────
        let writes = self.write_set(&staged, now)?;
        let undo = self.db.commit(&writes)?;

        // ── External transfers ────────────────────────────────────────────────
        let mut done: Vec<Transfer> = Vec::with_capacity(staged.transfers.len());
        for t in &staged.transfers {
            if let Err(e) = self.token.transfer(&t.from, &t.to, t.amount) {
                warn!(caller = %call.caller, error = %e, "transfer failed; rolling back call");
                self.roll_back(&done, &undo);
                return Err(e);
            }
            done.push(*t);
        }

        info!(
            caller = %call.caller,
            events = staged.events.len(),
            transfers = done.len(),
            "applied call"
        );
        Ok(staged.events)
    }

    fn roll_back(&self, done: &[Transfer], undo: &WriteSet) {
        for t in done.iter().rev() {
            let r = t.reversed();
            if let Err(e) = self.token.transfer(&r.from, &r.to, r.amount) {
                error!(from = %r.from, to = %r.to, amount = r.amount, error = %e, "failed to reverse transfer");
            }
        }
        if let Err(e) = self.db.commit(undo) {
            error!(error = %e, "failed to restore state after rejected transfer");
        }
    }

    fn write_set(&self, staged: &StagedMutations, now: Timestamp) -> Result<WriteSet, BallotvestError> {
        let mut w = WriteSet::default();
        for e in &staged.elections {
            w.put(Table::Elections, election_key(e.id).to_vec(), encode(e)?);
        }
        for v in &staged.voters {
            w.put(Table::Voters, v.as_bytes().to_vec(), Vec::new());
        }
        for s in &staged.schedules {
            w.put(Table::Schedules, s.beneficiary.as_bytes().to_vec(), encode(s)?);
        }
        for (account, authorized) in &staged.admins {
            if *authorized {
                w.put(Table::Admins, account.as_bytes().to_vec(), Vec::new());
            } else {
                w.delete(Table::Admins, account.as_bytes().to_vec());
            }
        }
        if let Some(next) = staged.next_election_id {
            w.put(Table::Meta, META_NEXT_ELECTION_ID, encode(&next)?);
        }
        if !staged.events.is_empty() {
            let mut seq = self.db.next_event_seq()?;
            for event in &staged.events {
                let record = EventRecord { seq, timestamp: now, event: event.clone() };
                w.put(Table::Events, seq.to_be_bytes().to_vec(), encode(&record)?);
                seq += 1;
            }
            w.put(Table::Meta, META_NEXT_EVENT_SEQ, encode(&seq)?);
        }
        Ok(w)
    }

    // ── Read views ────────────────────────────────────────────────────────────

    pub fn access(&self) -> AccessControl<'_> {
        AccessControl::new(&self.db)
    }

    pub fn registry(&self) -> ElectionRegistry<'_> {
        ElectionRegistry::new(&self.db)
    }

    pub fn vesting(&self) -> VestingLedger<'_> {
        VestingLedger::new(&self.db, self.params.period_secs)
    }

    pub fn owner(&self) -> Result<Address, BallotvestError> {
        self.access().owner()
    }

    pub fn is_authorized(&self, account: &Address) -> Result<bool, BallotvestError> {
        self.access().is_authorized(account)
    }

    pub fn is_registered(&self, voter: &Address) -> Result<bool, BallotvestError> {
        self.registry().is_registered(voter)
    }

    pub fn election(&self, id: ElectionId) -> Result<Election, BallotvestError> {
        self.registry().election(id)
    }

    pub fn election_count(&self) -> Result<u64, BallotvestError> {
        self.registry().election_count()
    }

    pub fn leading_candidate(&self, id: ElectionId) -> Result<Candidate, BallotvestError> {
        self.registry().leading_candidate(id)
    }

    pub fn schedule(&self, beneficiary: &Address) -> Result<Option<VestingSchedule>, BallotvestError> {
        self.vesting().schedule(beneficiary)
    }

    pub fn claimable_amount(&self, beneficiary: &Address, now: Timestamp) -> Result<Balance, BallotvestError> {
        self.vesting().claimable_amount(beneficiary, now)
    }

    pub fn vesting_info(&self, beneficiary: &Address, now: Timestamp) -> Result<VestingInfo, BallotvestError> {
        self.vesting().vesting_info(beneficiary, now)
    }

    pub fn events(&self) -> Result<Vec<EventRecord>, BallotvestError> {
        self.db.iter_events()
    }
}

// ── Action dispatch ───────────────────────────────────────────────────────────

fn dispatch(step: &mut Step<'_>, call: &Call) -> Result<(), BallotvestError> {
    let caller = &call.caller;
    match &call.action {
        Action::SetAdmin { account, authorized } => access::set_admin(step, caller, account, *authorized),

        Action::RegisterVoter => registry::register(step, caller),

        Action::CreateElection { name, candidate_names, candidate_addresses, start_time, end_time } => {
            registry::create_election(
                step,
                caller,
                name,
                candidate_names,
                candidate_addresses,
                *start_time,
                *end_time,
            )
            .map(|_| ())
        }

        Action::Vote { election_id, candidate_index } => {
            registry::vote(step, caller, *election_id, *candidate_index)
        }

        Action::Finalize { election_id } => distributor::finalize(step, caller, *election_id),

        Action::AddVesting { beneficiary, amount } => vesting::add_vesting(step, caller, beneficiary, *amount),

        Action::Claim => vesting::claim(step, caller).map(|_| ()),
    }
}
