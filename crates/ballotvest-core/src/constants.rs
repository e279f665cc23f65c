/// ─── Ballotvest Constants ───────────────────────────────────────────────────
///
/// Election winners are paid through linear unlock schedules.

// ── Vesting ──────────────────────────────────────────────────────────────────

/// Number of unlock periods in every vesting schedule.
pub const VESTING_PERIODS: u64 = 10;

/// Default length of one unlock period (seconds). 30 days.
pub const DEFAULT_PERIOD_SECS: i64 = 30 * 24 * 3600;

// ── Elections ────────────────────────────────────────────────────────────────

/// Default token balance a voter must hold to register.
pub const DEFAULT_REQUIRED_TOKEN_BALANCE: u128 = 1;

/// Default reward split among the winners of each finalized election.
pub const DEFAULT_TOTAL_REWARD_AMOUNT: u128 = 1_000;

// ── System accounts ──────────────────────────────────────────────────────────

/// Label hashed into the reward pool address. The pool funds every payout and
/// acts as the distributor's identity towards the vesting ledger.
pub const REWARD_POOL_LABEL: &str = "ballotvest/reward-pool";

/// Label hashed into the vesting custody address.
pub const VESTING_CUSTODY_LABEL: &str = "ballotvest/vesting-custody";

// ── Store meta keys ──────────────────────────────────────────────────────────

pub const META_OWNER: &str = "owner";
pub const META_PARAMS: &str = "params";
pub const META_NEXT_ELECTION_ID: &str = "next_election_id";
pub const META_NEXT_EVENT_SEQ: &str = "next_event_seq";
