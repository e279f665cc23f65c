//! Elections, candidates, the voter registry and ballot casting.

use ballotvest_core::election::{Candidate, Election};
use ballotvest_core::error::BallotvestError;
use ballotvest_core::event::Event;
use ballotvest_core::types::{Address, ElectionId, Timestamp};
use tracing::debug;

use crate::access::AccessControl;
use crate::db::StateDb;
use crate::engine::Step;

/// Read views over elections and registered voters.
pub struct ElectionRegistry<'a> {
    db: &'a StateDb,
}

impl<'a> ElectionRegistry<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn election(&self, id: ElectionId) -> Result<Election, BallotvestError> {
        self.db.get_election(id)?.ok_or(BallotvestError::ElectionNotFound(id))
    }

    pub fn elections(&self) -> Result<Vec<Election>, BallotvestError> {
        self.db.iter_elections()
    }

    pub fn election_count(&self) -> Result<u64, BallotvestError> {
        self.db.next_election_id()
    }

    pub fn is_registered(&self, voter: &Address) -> Result<bool, BallotvestError> {
        self.db.is_registered(voter)
    }

    /// First candidate with the strict maximum vote count; ties go to the
    /// lowest index.
    pub fn leading_candidate(&self, id: ElectionId) -> Result<Candidate, BallotvestError> {
        let election = self.election(id)?;
        election
            .leading_candidate()
            .map(|(_, c)| c.clone())
            .ok_or(BallotvestError::CandidateIndexOutOfRange { index: 0, count: 0 })
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

/// Register `caller` as a voter if it holds enough tokens. Registering twice
/// succeeds without effect.
pub(crate) fn register(step: &mut Step<'_>, caller: &Address) -> Result<(), BallotvestError> {
    let need = step.params.required_token_balance;
    let have = step.tokens.balance_of(caller)?;
    if have < need {
        return Err(BallotvestError::InsufficientTokenBalance { need, have });
    }
    if step.db.is_registered(caller)? {
        debug!(voter = %caller, "already registered");
        return Ok(());
    }
    step.staged.voters.push(*caller);
    step.emit(Event::VoterRegistered { voter: *caller });
    Ok(())
}

pub(crate) fn create_election(
    step: &mut Step<'_>,
    caller: &Address,
    name: &str,
    candidate_names: &[String],
    candidate_addresses: &[Address],
    start_time: Timestamp,
    end_time: Timestamp,
) -> Result<ElectionId, BallotvestError> {
    AccessControl::new(step.db).require_owner(caller)?;

    if candidate_names.len() != candidate_addresses.len() {
        return Err(BallotvestError::CandidateListMismatch {
            names: candidate_names.len(),
            addresses: candidate_addresses.len(),
        });
    }
    if start_time >= end_time {
        return Err(BallotvestError::InvalidTimeRange { start: start_time, end: end_time });
    }

    let id = step.db.next_election_id()?;
    let candidates = candidate_names
        .iter()
        .zip(candidate_addresses)
        .map(|(n, a)| Candidate::new(n.clone(), *a))
        .collect();
    let election = Election::new(id, name, candidates, start_time, end_time);

    step.staged.elections.push(election);
    step.staged.next_election_id = Some(id + 1);
    step.emit(Event::ElectionCreated {
        id,
        name: name.to_string(),
        start_time,
        end_time,
    });
    debug!(election_id = id, "election staged");
    Ok(id)
}

/// Cast one ballot. The only effects are one vote-count increment and one
/// voter-set insertion.
pub(crate) fn vote(
    step: &mut Step<'_>,
    caller: &Address,
    election_id: ElectionId,
    candidate_index: usize,
) -> Result<(), BallotvestError> {
    if !step.db.is_registered(caller)? {
        return Err(BallotvestError::NotRegistered(caller.to_string()));
    }
    let mut election = step.election(election_id)?;

    if !election.has_started(step.now) {
        return Err(BallotvestError::ElectionNotStarted);
    }
    if election.has_ended(step.now) {
        return Err(BallotvestError::ElectionEnded);
    }
    if election.finalized {
        return Err(BallotvestError::ElectionFinalized);
    }
    if election.has_voted(caller) {
        return Err(BallotvestError::AlreadyVoted);
    }
    let count = election.candidates.len();
    let candidate = election
        .candidates
        .get_mut(candidate_index)
        .ok_or(BallotvestError::CandidateIndexOutOfRange { index: candidate_index, count })?;

    candidate.vote_count += 1;
    election.voters.insert(*caller);

    step.staged.elections.push(election);
    step.emit(Event::VoteCast {
        election_id,
        voter: *caller,
        candidate_index,
    });
    Ok(())
}
