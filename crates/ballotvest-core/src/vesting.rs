//! Linear unlock schedules.
//!
//! A schedule releases `total` in `duration_periods` equal steps, one per
//! elapsed period since `start_time`. All arithmetic is unsigned and
//! truncating; nothing rounds up.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Balance, Timestamp};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VestingSchedule {
    pub beneficiary: Address,
    /// Fixed at creation.
    pub total: Balance,
    /// Never decreases and never exceeds `total`.
    pub claimed: Balance,
    pub start_time: Timestamp,
    pub duration_periods: u64,
}

impl VestingSchedule {
    pub fn new(beneficiary: Address, total: Balance, start_time: Timestamp, duration_periods: u64) -> Self {
        Self { beneficiary, total, claimed: 0, start_time, duration_periods }
    }

    /// Whole periods since `start_time`. A clock reading before the start
    /// counts as zero.
    pub fn periods_elapsed(&self, now: Timestamp, period_secs: i64) -> u64 {
        if period_secs <= 0 || now <= self.start_time {
            return 0;
        }
        now.abs_diff(self.start_time) / period_secs as u64
    }

    /// `min(total, floor(total * periods / duration))`.
    pub fn unlocked_at(&self, now: Timestamp, period_secs: i64) -> Balance {
        let periods = self.periods_elapsed(now, period_secs);
        if self.duration_periods == 0 || periods >= self.duration_periods {
            return self.total;
        }
        // floor(total * p / d) without the wide product:
        // total = q*d + r  ⇒  total*p/d = q*p + floor(r*p/d), with r < d.
        let d = self.duration_periods as Balance;
        let p = periods as Balance;
        let q = self.total / d;
        let r = self.total % d;
        (q * p + r * p / d).min(self.total)
    }

    pub fn claimable_at(&self, now: Timestamp, period_secs: i64) -> Balance {
        self.unlocked_at(now, period_secs).saturating_sub(self.claimed)
    }

    pub fn is_fully_claimed(&self) -> bool {
        self.claimed >= self.total
    }

    pub fn info_at(&self, now: Timestamp, period_secs: i64) -> VestingInfo {
        VestingInfo {
            total: self.total,
            claimed: self.claimed,
            unlocked: self.claimed + self.claimable_at(now, period_secs),
        }
    }
}

/// Aggregate view of one beneficiary's schedule.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VestingInfo {
    pub total: Balance,
    pub claimed: Balance,
    /// `claimed + currently claimable`.
    pub unlocked: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::VESTING_PERIODS;

    const PERIOD: i64 = 100;

    fn schedule(total: Balance) -> VestingSchedule {
        VestingSchedule::new(Address::derive("b"), total, 1_000, VESTING_PERIODS)
    }

    #[test]
    fn nothing_unlocks_inside_first_period() {
        let s = schedule(600);
        assert_eq!(s.claimable_at(1_000, PERIOD), 0);
        assert_eq!(s.claimable_at(1_099, PERIOD), 0);
        assert_eq!(s.claimable_at(1_100, PERIOD), 60);
    }

    #[test]
    fn three_periods_of_six_hundred() {
        let s = schedule(600);
        assert_eq!(s.claimable_at(1_000 + 3 * PERIOD, PERIOD), 180);
        assert_eq!(s.claimable_at(1_000 + 3 * PERIOD + 99, PERIOD), 180);
    }

    #[test]
    fn claimable_subtracts_claimed() {
        let mut s = schedule(600);
        s.claimed = 180;
        assert_eq!(s.claimable_at(1_300, PERIOD), 0);
        assert_eq!(s.claimable_at(1_500, PERIOD), 120);
        let info = s.info_at(1_500, PERIOD);
        assert_eq!(info, VestingInfo { total: 600, claimed: 180, unlocked: 300 });
    }

    #[test]
    fn saturates_at_total() {
        let s = schedule(1_001);
        assert_eq!(s.unlocked_at(1_000 + 10 * PERIOD, PERIOD), 1_001);
        assert_eq!(s.unlocked_at(1_000 + 500 * PERIOD, PERIOD), 1_001);
    }

    #[test]
    fn truncates_each_step() {
        // 333 * 1 / 10 = 33.3 → 33
        let s = schedule(333);
        assert_eq!(s.unlocked_at(1_100, PERIOD), 33);
        assert_eq!(s.unlocked_at(1_900, PERIOD), 299);
    }

    #[test]
    fn clock_before_start_unlocks_nothing() {
        let s = schedule(600);
        assert_eq!(s.periods_elapsed(0, PERIOD), 0);
        assert_eq!(s.claimable_at(0, PERIOD), 0);
    }

    #[test]
    fn monotonic_in_time() {
        let s = schedule(777);
        let mut prev = 0;
        for t in (1_000..1_000 + 12 * PERIOD).step_by(7) {
            let u = s.unlocked_at(t, PERIOD);
            assert!(u >= prev);
            assert!(u <= s.total);
            prev = u;
        }
        assert_eq!(prev, 777);
    }

    #[test]
    fn huge_totals_do_not_overflow() {
        let s = schedule(u128::MAX);
        assert_eq!(s.unlocked_at(1_000 + 5 * PERIOD, PERIOD), u128::MAX / 2);
    }

    #[test]
    fn extreme_clock_readings_do_not_overflow() {
        let s = VestingSchedule::new(Address::derive("b"), 600, -10, VESTING_PERIODS);
        assert_eq!(s.periods_elapsed(i64::MAX, 100), (i64::MAX as u64 + 10) / 100);
        assert_eq!(s.unlocked_at(i64::MAX, 100), 600);
        assert_eq!(s.claimable_at(i64::MAX, 100), 600);

        let late = VestingSchedule::new(Address::derive("b"), 600, i64::MAX - 1, VESTING_PERIODS);
        assert_eq!(late.unlocked_at(i64::MIN, 100), 0);
        assert_eq!(late.unlocked_at(i64::MAX, 1), 60);
    }
}
