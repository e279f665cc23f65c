//! Election finalization and reward distribution.
//!
//! Finalization is the only path that creates schedules on behalf of
//! election winners. Every candidate sharing the top vote count wins and
//! receives `floor(total_reward / winners)`; the remainder stays in the
//! reward pool.

use ballotvest_core::election::split_reward;
use ballotvest_core::error::BallotvestError;
use ballotvest_core::event::Event;
use ballotvest_core::types::{Address, ElectionId};
use tracing::{debug, info};

use crate::access::AccessControl;
use crate::engine::Step;
use crate::token::Transfer;
use crate::vesting;

pub(crate) fn finalize(
    step: &mut Step<'_>,
    caller: &Address,
    election_id: ElectionId,
) -> Result<(), BallotvestError> {
    AccessControl::new(step.db).require_owner(caller)?;

    let mut election = step.election(election_id)?;
    if !election.has_ended(step.now) {
        return Err(BallotvestError::ElectionOngoing);
    }
    if election.finalized {
        return Err(BallotvestError::AlreadyFinalized);
    }

    // Flag first; it is committed before any transfer runs.
    election.finalized = true;
    step.staged.elections.push(election.clone());

    let tally = election.tally();
    if tally.is_empty() {
        info!(election_id, "finalized without votes; nothing to distribute");
        step.emit(Event::ElectionFinalized { election_id });
        return Ok(());
    }

    let split = split_reward(step.params.total_reward_amount, tally.num_winners);
    let distributor = step.params.reward_pool;
    let custody = step.params.vesting_custody;

    for idx in election.winner_indices(&tally) {
        let payout = election.candidates[idx].payout;
        step.stage_transfer(Transfer { from: distributor, to: custody, amount: split.per_winner })?;
        vesting::add_vesting(step, &distributor, &payout, split.per_winner)?;
    }

    debug!(
        election_id,
        winners = tally.num_winners,
        per_winner = split.per_winner,
        dust = split.dust,
        "rewards staged"
    );
    step.emit(Event::RewardDistributed { election_id, reward_per_winner: split.per_winner });
    step.emit(Event::ElectionFinalized { election_id });
    Ok(())
}
