//! Per-beneficiary unlock schedules: creation, claims and read views.

use ballotvest_core::constants::VESTING_PERIODS;
use ballotvest_core::error::BallotvestError;
use ballotvest_core::event::Event;
use ballotvest_core::types::{Address, Balance, Timestamp};
use ballotvest_core::vesting::{VestingInfo, VestingSchedule};
use tracing::debug;

use crate::access::AccessControl;
use crate::db::StateDb;
use crate::engine::Step;
use crate::token::Transfer;

/// Read views over vesting schedules.
pub struct VestingLedger<'a> {
    db: &'a StateDb,
    period_secs: i64,
}

impl<'a> VestingLedger<'a> {
    pub fn new(db: &'a StateDb, period_secs: i64) -> Self {
        Self { db, period_secs }
    }

    pub fn schedule(&self, beneficiary: &Address) -> Result<Option<VestingSchedule>, BallotvestError> {
        self.db.get_schedule(beneficiary)
    }

    pub fn schedules(&self) -> Result<Vec<VestingSchedule>, BallotvestError> {
        self.db.iter_schedules()
    }

    /// Zero when `beneficiary` has no schedule.
    pub fn claimable_amount(&self, beneficiary: &Address, now: Timestamp) -> Result<Balance, BallotvestError> {
        Ok(self
            .schedule(beneficiary)?
            .map(|s| s.claimable_at(now, self.period_secs))
            .unwrap_or(0))
    }

    /// All zero when `beneficiary` has no schedule.
    pub fn vesting_info(&self, beneficiary: &Address, now: Timestamp) -> Result<VestingInfo, BallotvestError> {
        Ok(self
            .schedule(beneficiary)?
            .map(|s| s.info_at(now, self.period_secs))
            .unwrap_or_default())
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

/// Create the one schedule `beneficiary` will ever have. Owner or admin.
pub(crate) fn add_vesting(
    step: &mut Step<'_>,
    caller: &Address,
    beneficiary: &Address,
    amount: Balance,
) -> Result<(), BallotvestError> {
    AccessControl::new(step.db).require_authorized(caller)?;

    if beneficiary.is_zero() {
        return Err(BallotvestError::ZeroAddress);
    }
    if amount == 0 {
        return Err(BallotvestError::ZeroAmount);
    }
    if step.schedule(beneficiary)?.is_some() {
        return Err(BallotvestError::ScheduleExists(beneficiary.to_string()));
    }

    let schedule = VestingSchedule::new(*beneficiary, amount, step.now, VESTING_PERIODS);
    step.staged.schedules.push(schedule);
    step.emit(Event::VestingAdded {
        beneficiary: *beneficiary,
        amount,
        start_time: step.now,
        duration_periods: VESTING_PERIODS,
    });
    debug!(%beneficiary, amount, "vesting schedule staged");
    Ok(())
}

/// Pay out everything unlocked and not yet claimed.
pub(crate) fn claim(step: &mut Step<'_>, caller: &Address) -> Result<Balance, BallotvestError> {
    let mut schedule = step
        .schedule(caller)?
        .ok_or_else(|| BallotvestError::NoSchedule(caller.to_string()))?;

    let amount = schedule.claimable_at(step.now, step.params.period_secs);
    if amount == 0 {
        return Err(BallotvestError::NothingClaimable);
    }

    // Record the claim before the transfer is planned; the transfer only runs
    // once this is committed.
    schedule.claimed += amount;
    step.staged.schedules.push(schedule);

    let custody = step.params.vesting_custody;
    step.stage_transfer(Transfer { from: custody, to: *caller, amount })?;
    step.emit(Event::TokensClaimed { beneficiary: *caller, amount });
    Ok(amount)
}
