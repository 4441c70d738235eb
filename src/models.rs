// Request/response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use crate::ballots::VoteOption;
use crate::errors::{ErrorKind, VotingError};
use crate::resolution::Resolution;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionRequest {
    pub caller: String,
    pub text: String,
    pub start_time: u64,
    pub end_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionResponse {
    pub success: bool,
    pub question_id: u64,
}

/// Body for admin-only operations without other inputs
#[derive(Debug, Clone, Deserialize)]
pub struct CallerRequest {
    pub caller: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseQuestionResponse {
    pub success: bool,
    pub question_id: u64,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub caller: String,
    /// 0 = YES, 1 = NO, 2 = ABSTAIN. Signed and wide so that any JSON
    /// integer reaches the engine and is rejected as an invalid option.
    pub option: i64,
    /// Deposit attached to the vote
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub question_id: u64,
    pub option: VoteOption,
    pub stake: u64,
    pub receipt: String,
    pub new_balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteCountsResponse {
    pub question_id: u64,
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub question_id: u64,
    /// YES is the sole winner
    pub yes_won: bool,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawResponse {
    pub question_id: u64,
    pub is_draw: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiedOptionsResponse {
    pub question_id: u64,
    pub tied_options: Vec<VoteOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub question_id: u64,
    pub payout: u64,
    pub vault_share: u64,
    pub new_balance: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FundRequest {
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultResponse {
    pub address: String,
    /// Balance of the vault account
    pub balance: u64,
    pub escrowed: u64,
    pub total_credited: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: Option<ErrorKind>,
}

impl From<&VotingError> for ErrorResponse {
    fn from(e: &VotingError) -> Self {
        Self {
            success: false,
            error: e.to_string(),
            kind: Some(e.kind()),
        }
    }
}
