// ============================================================================
// Voting Errors
// ============================================================================
//
// Every rejected operation is reported as a VotingError. Errors fall into
// four kinds:
//
//   Validation    - malformed input (window, option, stake amount)
//   State         - operation not valid in the current lifecycle state
//   Authorization - caller lacks the administrator role
//   Transfer      - the account store refused a debit or credit
//
// None of them leave partial state behind.
//
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Broad classification used by callers to decide what to do next
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    State,
    Authorization,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotingError {
    // Validation
    InvalidWindow { start_time: u64, end_time: u64, now: u64 },
    InvalidOption(i64),
    WrongStakeAmount { expected: u64, got: u64 },

    // State
    QuestionNotFound(u64),
    QuestionNotOpen(u64),
    AlreadyVoted { question_id: u64, voter: String },
    AlreadyClosed(u64),
    NotYetEndable { question_id: u64, end_time: u64, now: u64 },
    NotYetClosed(u64),
    AlreadyClaimed { question_id: u64, voter: String },
    NoBallot { question_id: u64, voter: String },

    // Authorization
    Unauthorized(String),

    // Transfer
    TransferFailed(LedgerError),
}

impl VotingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VotingError::InvalidWindow { .. }
            | VotingError::InvalidOption(_)
            | VotingError::WrongStakeAmount { .. } => ErrorKind::Validation,
            VotingError::Unauthorized(_) => ErrorKind::Authorization,
            VotingError::TransferFailed(_) => ErrorKind::Transfer,
            _ => ErrorKind::State,
        }
    }
}

impl std::fmt::Display for VotingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingError::InvalidWindow { start_time, end_time, now } => write!(
                f,
                "Invalid voting window: start {} end {} (now {})",
                start_time, end_time, now
            ),
            VotingError::InvalidOption(raw) => write!(f, "Invalid option: {}", raw),
            VotingError::WrongStakeAmount { expected, got } => {
                write!(f, "Wrong stake amount: expected {}, got {}", expected, got)
            }
            VotingError::QuestionNotFound(id) => write!(f, "Question not found: {}", id),
            VotingError::QuestionNotOpen(id) => write!(f, "Question {} is not open for voting", id),
            VotingError::AlreadyVoted { question_id, voter } => {
                write!(f, "{} already voted on question {}", voter, question_id)
            }
            VotingError::AlreadyClosed(id) => write!(f, "Question {} is already closed", id),
            VotingError::NotYetEndable { question_id, end_time, now } => write!(
                f,
                "Question {} cannot be closed before {} (now {})",
                question_id, end_time, now
            ),
            VotingError::NotYetClosed(id) => write!(f, "Question {} is not closed yet", id),
            VotingError::AlreadyClaimed { question_id, voter } => {
                write!(f, "{} already claimed on question {}", voter, question_id)
            }
            VotingError::NoBallot { question_id, voter } => {
                write!(f, "{} has no ballot on question {}", voter, question_id)
            }
            VotingError::Unauthorized(caller) => write!(f, "Unauthorized caller: {}", caller),
            VotingError::TransferFailed(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for VotingError {}

impl From<LedgerError> for VotingError {
    fn from(e: LedgerError) -> Self {
        VotingError::TransferFailed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(VotingError::InvalidOption(7).kind(), ErrorKind::Validation);
        assert_eq!(VotingError::NotYetClosed(1).kind(), ErrorKind::State);
        assert_eq!(VotingError::QuestionNotFound(9).kind(), ErrorKind::State);
        assert_eq!(VotingError::Unauthorized("0xabc".into()).kind(), ErrorKind::Authorization);

        let transfer: VotingError = LedgerError::AccountFrozen("0xabc".into()).into();
        assert_eq!(transfer.kind(), ErrorKind::Transfer);
    }

    #[test]
    fn test_display() {
        let e = VotingError::WrongStakeAmount { expected: 100, got: 50 };
        assert_eq!(e.to_string(), "Wrong stake amount: expected 100, got 50");
    }
}
