use thiserror::Error;

/// Coarse classification of every failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the required role.
    Authorization,
    /// Malformed input.
    Validation,
    /// Operation attempted in the wrong lifecycle phase.
    State,
    /// External token movement failed.
    Transfer,
    /// Persistence or encoding failure.
    Storage,
}

#[derive(Debug, Error)]
pub enum BallotvestError {
    // ── Authorization ────────────────────────────────────────────────────────
    #[error("caller {0} is not the owner")]
    NotOwner(String),

    #[error("caller {0} is not an authorized admin")]
    NotAuthorized(String),

    #[error("voter {0} is not registered")]
    NotRegistered(String),

    #[error("token balance too low to register: need {need}, have {have}")]
    InsufficientTokenBalance { need: u128, have: u128 },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("candidate names and addresses differ in length ({names} vs {addresses})")]
    CandidateListMismatch { names: usize, addresses: usize },

    #[error("invalid time range: start {start} must be before end {end}")]
    InvalidTimeRange { start: i64, end: i64 },

    #[error("candidate index {index} out of range ({count} candidates)")]
    CandidateIndexOutOfRange { index: usize, count: usize },

    #[error("election {0} not found")]
    ElectionNotFound(u64),

    #[error("beneficiary must not be the zero address")]
    ZeroAddress,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("vesting schedule already exists for {0}")]
    ScheduleExists(String),

    #[error("no vesting schedule for {0}")]
    NoSchedule(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid ledger parameters: {0}")]
    InvalidParams(String),

    // ── Lifecycle ────────────────────────────────────────────────────────────
    #[error("election not started")]
    ElectionNotStarted,

    #[error("election ended")]
    ElectionEnded,

    #[error("election finalized")]
    ElectionFinalized,

    #[error("already voted")]
    AlreadyVoted,

    #[error("election still ongoing")]
    ElectionOngoing,

    #[error("election already finalized")]
    AlreadyFinalized,

    #[error("nothing claimable")]
    NothingClaimable,

    #[error("genesis already applied")]
    GenesisAlreadyApplied,

    #[error("store not initialised: run genesis first")]
    NotInitialised,

    // ── Transfers ────────────────────────────────────────────────────────────
    #[error("insufficient tokens in {holder}: need {need}, have {have}")]
    InsufficientTokens { holder: String, need: u128, have: u128 },

    #[error("token transfer rejected: {0}")]
    TransferRejected(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl BallotvestError {
    pub fn kind(&self) -> ErrorKind {
        use BallotvestError::*;
        match self {
            NotOwner(_) | NotAuthorized(_) | NotRegistered(_) | InsufficientTokenBalance { .. } => {
                ErrorKind::Authorization
            }
            CandidateListMismatch { .. }
            | InvalidTimeRange { .. }
            | CandidateIndexOutOfRange { .. }
            | ElectionNotFound(_)
            | ZeroAddress
            | ZeroAmount
            | ScheduleExists(_)
            | NoSchedule(_)
            | InvalidAddress(_)
            | InvalidParams(_) => ErrorKind::Validation,
            ElectionNotStarted
            | ElectionEnded
            | ElectionFinalized
            | AlreadyVoted
            | ElectionOngoing
            | AlreadyFinalized
            | NothingClaimable
            | GenesisAlreadyApplied
            | NotInitialised => ErrorKind::State,
            InsufficientTokens { .. } | TransferRejected(_) => ErrorKind::Transfer,
            Serialization(_) | Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_messages_match_taxonomy() {
        assert_eq!(BallotvestError::ElectionOngoing.to_string(), "election still ongoing");
        assert_eq!(BallotvestError::NothingClaimable.to_string(), "nothing claimable");
        assert_eq!(BallotvestError::AlreadyVoted.kind(), ErrorKind::State);
    }

    #[test]
    fn kinds() {
        assert_eq!(BallotvestError::NotOwner("x".into()).kind(), ErrorKind::Authorization);
        assert_eq!(BallotvestError::ScheduleExists("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(
            BallotvestError::InsufficientTokens { holder: "x".into(), need: 2, have: 1 }.kind(),
            ErrorKind::Transfer
        );
        assert_eq!(BallotvestError::Storage("io".into()).kind(), ErrorKind::Storage);
    }
}
