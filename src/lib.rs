/// Staked Voting Ledger
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod ballots;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod questions;
pub mod resolution;
pub mod routes;
pub mod settlement;

pub use app_state::{AppState, Engine, SharedState};
pub use ballots::{Ballot, BallotLedger, VoteCheck, VoteOption};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineSnapshot, QuestionView, VotingEngine};
pub use errors::{ErrorKind, VotingError};
pub use ledger::{AccountStore, Ledger, LedgerError, LedgerStats, Transaction, TxType};
pub use questions::{Question, QuestionRegistry, QuestionStatus, Tally};
pub use resolution::{resolve, Resolution};
pub use routes::build_router;
pub use settlement::{payout_for, ClaimReceipt, PayoutKind, PayoutSplit, SettlementSummary, Vault};
