use ballotvest_core::error::BallotvestError;
use ballotvest_core::types::{Address, Timestamp};
use ballotvest_core::vesting::VestingSchedule;
use ballotvest_state::StateDb;
use chrono::DateTime;

use crate::schedule::{unlock_timeline, UnlockStep};

/// Query helpers for vesting schedules.
pub struct VestingQuery<'a> {
    db: &'a StateDb,
    period_secs: i64,
}

impl<'a> VestingQuery<'a> {
    pub fn new(db: &'a StateDb, period_secs: i64) -> Self {
        Self { db, period_secs }
    }

    /// Fetch the schedule of `beneficiary`, if any.
    pub fn get(&self, beneficiary: &Address) -> Result<Option<VestingSchedule>, BallotvestError> {
        self.db.get_schedule(beneficiary)
    }

    /// Unlock timeline of the schedule held by `beneficiary`.
    pub fn timeline(&self, beneficiary: &Address) -> Result<Vec<UnlockStep>, BallotvestError> {
        let s = self.require(beneficiary)?;
        Ok(unlock_timeline(&s, self.period_secs))
    }

    /// Next boundary that will release tokens, strictly after `now`.
    pub fn next_unlock(&self, beneficiary: &Address, now: Timestamp) -> Result<Option<UnlockStep>, BallotvestError> {
        Ok(self
            .timeline(beneficiary)?
            .into_iter()
            .find(|step| step.unlock_at > now && step.amount > 0))
    }

    /// Human-readable summary of a schedule's state.
    pub fn describe(&self, beneficiary: &Address, now: Timestamp) -> Result<String, BallotvestError> {
        let s = self.require(beneficiary)?;
        let info = s.info_at(now, self.period_secs);
        let claimable = info.unlocked - info.claimed;

        let status = if s.is_fully_claimed() {
            "fully claimed".to_string()
        } else if info.unlocked == s.total {
            format!("fully unlocked, {} claimable", claimable)
        } else {
            let periods = s.periods_elapsed(now, self.period_secs);
            match self.next_unlock(beneficiary, now)? {
                Some(next) => format!(
                    "{}/{} periods elapsed, {} claimable, next unlock {} on {}",
                    periods,
                    s.duration_periods,
                    claimable,
                    next.amount,
                    format_time(next.unlock_at)
                ),
                None => format!("{}/{} periods elapsed, {} claimable", periods, s.duration_periods, claimable),
            }
        };

        Ok(format!(
            "Vesting {} | total {} | unlocked {} | claimed {} | started {} | {}",
            s.beneficiary,
            s.total,
            info.unlocked,
            info.claimed,
            format_time(s.start_time),
            status
        ))
    }

    fn require(&self, beneficiary: &Address) -> Result<VestingSchedule, BallotvestError> {
        self.db
            .get_schedule(beneficiary)?
            .ok_or_else(|| BallotvestError::NoSchedule(beneficiary.to_string()))
    }
}

fn format_time(ts: Timestamp) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
