use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{Address, Balance, ElectionId, Timestamp};

// ── Candidate ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    /// Display name.
    pub name: String,
    /// Receives the vesting schedule if this candidate wins.
    pub payout: Address,
    /// Incremented exactly once per accepted ballot.
    pub vote_count: u64,
}

impl Candidate {
    pub fn new(name: impl Into<String>, payout: Address) -> Self {
        Self { name: name.into(), payout, vote_count: 0 }
    }
}

// ── Election ─────────────────────────────────────────────────────────────────

/// A time-bounded ballot over a fixed candidate list.
///
/// Votes are accepted while `start_time <= now <= end_time`. `finalized`
/// flips false → true exactly once, and `voters` only grows.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Election {
    pub id: ElectionId,
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub finalized: bool,
    pub candidates: Vec<Candidate>,
    /// Addresses that have cast a ballot in this election.
    pub voters: BTreeSet<Address>,
}

impl Election {
    pub fn new(
        id: ElectionId,
        name: impl Into<String>,
        candidates: Vec<Candidate>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_time,
            end_time,
            finalized: false,
            candidates,
            voters: BTreeSet::new(),
        }
    }

    pub fn has_started(&self, now: Timestamp) -> bool {
        now >= self.start_time
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now > self.end_time
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    /// First candidate holding the strict maximum vote count. Ties go to the
    /// lowest index. Finalization does not use this; see [`Election::tally`].
    pub fn leading_candidate(&self) -> Option<(usize, &Candidate)> {
        let mut leader: Option<(usize, &Candidate)> = None;
        for (i, c) in self.candidates.iter().enumerate() {
            match leader {
                Some((_, best)) if c.vote_count <= best.vote_count => {}
                _ => leader = Some((i, c)),
            }
        }
        leader
    }

    /// Single pass over the candidates: every candidate sharing the maximum
    /// vote count is a winner.
    pub fn tally(&self) -> Tally {
        let mut highest_vote_count = 0u64;
        let mut num_winners = 0usize;
        for c in &self.candidates {
            if c.vote_count > highest_vote_count {
                highest_vote_count = c.vote_count;
                num_winners = 1;
            } else if c.vote_count == highest_vote_count {
                num_winners += 1;
            }
        }
        Tally { highest_vote_count, num_winners }
    }

    /// Indices of the candidates sharing the maximum, in index order.
    pub fn winner_indices(&self, tally: &Tally) -> Vec<usize> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.vote_count == tally.highest_vote_count)
            .map(|(i, _)| i)
            .collect()
    }
}

// ── Tally / reward split ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tally {
    pub highest_vote_count: u64,
    pub num_winners: usize,
}

impl Tally {
    /// No ballot was cast; nothing is distributed.
    pub fn is_empty(&self) -> bool {
        self.highest_vote_count == 0
    }
}

/// Equal share of a reward among tied winners.
///
/// `dust` is the integer-division remainder. It is never distributed and
/// stays with the reward pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSplit {
    pub per_winner: Balance,
    pub dust: Balance,
}

pub fn split_reward(total: Balance, num_winners: usize) -> RewardSplit {
    if num_winners == 0 {
        return RewardSplit { per_winner: 0, dust: total };
    }
    let n = num_winners as Balance;
    RewardSplit { per_winner: total / n, dust: total % n }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election(counts: &[u64]) -> Election {
        let candidates = counts
            .iter()
            .enumerate()
            .map(|(i, n)| Candidate {
                name: format!("c{i}"),
                payout: Address::derive(&format!("c{i}")),
                vote_count: *n,
            })
            .collect();
        Election::new(0, "test", candidates, 100, 200)
    }

    #[test]
    fn tally_single_winner() {
        let e = election(&[1, 4, 2]);
        let t = e.tally();
        assert_eq!(t, Tally { highest_vote_count: 4, num_winners: 1 });
        assert_eq!(e.winner_indices(&t), vec![1]);
    }

    #[test]
    fn tally_counts_every_tied_candidate() {
        let e = election(&[3, 1, 3, 3]);
        let t = e.tally();
        assert_eq!(t, Tally { highest_vote_count: 3, num_winners: 3 });
        assert_eq!(e.winner_indices(&t), vec![0, 2, 3]);
    }

    #[test]
    fn tally_resets_on_new_maximum() {
        let e = election(&[2, 2, 5]);
        assert_eq!(e.tally(), Tally { highest_vote_count: 5, num_winners: 1 });
    }

    #[test]
    fn tally_without_votes_is_empty() {
        let t = election(&[0, 0]).tally();
        assert!(t.is_empty());
        assert!(election(&[]).tally().is_empty());
    }

    #[test]
    fn leading_candidate_prefers_lowest_index() {
        let e = election(&[1, 3, 3]);
        let (i, c) = e.leading_candidate().unwrap();
        assert_eq!(i, 1);
        assert_eq!(c.name, "c1");
        assert!(election(&[]).leading_candidate().is_none());
    }

    #[test]
    fn voting_window_bounds_are_inclusive() {
        let e = election(&[0]);
        assert!(!e.has_started(99));
        assert!(e.has_started(100));
        assert!(!e.has_ended(200));
        assert!(e.has_ended(201));
    }

    #[test]
    fn reward_split_truncates() {
        assert_eq!(split_reward(1000, 2), RewardSplit { per_winner: 500, dust: 0 });
        assert_eq!(split_reward(1000, 3), RewardSplit { per_winner: 333, dust: 1 });
        assert_eq!(split_reward(2, 3), RewardSplit { per_winner: 0, dust: 2 });
    }
}
