//! Per-period unlock timeline.
//!
//! A schedule unlocks `floor(total * k / duration)` after `k` whole periods,
//! so every step releases either `floor(total / duration)` or one unit more.

use ballotvest_core::types::{Balance, Timestamp};
use ballotvest_core::vesting::VestingSchedule;
use serde::Serialize;

/// One period boundary of a vesting schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockStep {
    /// 1-based period index.
    pub period: u64,
    /// First instant at which this period counts as elapsed.
    pub unlock_at: Timestamp,
    /// Amount released at this boundary.
    pub amount: Balance,
    /// Total unlocked once this boundary has passed.
    pub cumulative: Balance,
}

/// Every unlock boundary of `schedule`, in order.
pub fn unlock_timeline(schedule: &VestingSchedule, period_secs: i64) -> Vec<UnlockStep> {
    let mut steps = Vec::with_capacity(schedule.duration_periods as usize);
    let mut previous: Balance = 0;

    for period in 1..=schedule.duration_periods {
        let unlock_at = schedule
            .start_time
            .saturating_add((period as i64).saturating_mul(period_secs));
        let cumulative = schedule.unlocked_at(unlock_at, period_secs);
        steps.push(UnlockStep {
            period,
            unlock_at,
            amount: cumulative - previous,
            cumulative,
        });
        previous = cumulative;
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballotvest_core::constants::VESTING_PERIODS;
    use ballotvest_core::types::Address;

    const PERIOD: i64 = 86_400;

    fn schedule(total: Balance) -> VestingSchedule {
        VestingSchedule::new(Address::derive("beneficiary"), total, 1_000, VESTING_PERIODS)
    }

    #[test]
    fn timeline_has_one_step_per_period() {
        let steps = unlock_timeline(&schedule(600), PERIOD);
        assert_eq!(steps.len(), VESTING_PERIODS as usize);
        assert_eq!(steps[0].unlock_at, 1_000 + PERIOD);
        assert_eq!(steps[9].unlock_at, 1_000 + 10 * PERIOD);
        assert!(steps.iter().all(|s| s.amount == 60));
        assert_eq!(steps[2].cumulative, 180);
    }

    #[test]
    fn timeline_sums_to_total() {
        for total in [1, 9, 10, 1_001, 333, u128::MAX] {
            let steps = unlock_timeline(&schedule(total), PERIOD);
            let sum = steps.iter().fold(0u128, |acc, s| acc + s.amount);
            assert_eq!(sum, total, "timeline for {total} must release everything");
            assert_eq!(steps.last().unwrap().cumulative, total);
        }
    }

    #[test]
    fn steps_differ_by_at_most_one_unit() {
        let steps = unlock_timeline(&schedule(1_009), PERIOD);
        assert!(steps.iter().all(|s| s.amount == 100 || s.amount == 101));
        assert_eq!(steps.iter().filter(|s| s.amount == 101).count(), 9);
    }

    #[test]
    fn small_totals_release_in_whole_units() {
        // 3 over 10 periods: nothing until 4 periods, then one unit at a time.
        let steps = unlock_timeline(&schedule(3), PERIOD);
        let amounts: Vec<Balance> = steps.iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![0, 0, 0, 1, 0, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn cumulative_matches_schedule_at_each_boundary() {
        let s = schedule(777);
        for step in unlock_timeline(&s, PERIOD) {
            assert_eq!(s.unlocked_at(step.unlock_at, PERIOD), step.cumulative);
            assert_eq!(s.unlocked_at(step.unlock_at - 1, PERIOD), step.cumulative - step.amount);
        }
    }
}
