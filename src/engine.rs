// ============================================================================
// Voting Engine - the public operations of the staked voting system
// ============================================================================
//
// Wires the question registry, ballot ledger, resolution and settlement
// together over an account store and a clock. Every operation takes
// `&mut self` or `&self`, so a caller that shares the engine behind one lock
// gets the serialized, all-or-nothing semantics the settlement relies on.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ballots::{Ballot, BallotLedger, VoteCheck, VoteOption};
use crate::clock::Clock;
use crate::errors::VotingError;
use crate::ledger::{AccountStore, TxType};
use crate::questions::{Question, QuestionRegistry, QuestionStatus, Tally};
use crate::resolution::Resolution;
use crate::settlement::{execute_claim, ClaimReceipt, SettlementSummary, Vault};

/// Read-only view of a question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionView {
    pub id: u64,
    pub text: String,
    pub start_time: u64,
    pub end_time: u64,
    pub status: QuestionStatus,
    pub tally: Tally,
    pub ballots: usize,
}

/// Serializable engine state, without the account store and clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub stake_amount: u64,
    pub registry: QuestionRegistry,
    pub ballots: BallotLedger,
    pub vault: Vault,
}

pub struct VotingEngine<S: AccountStore, C: Clock> {
    stake_amount: u64,
    registry: QuestionRegistry,
    ballots: BallotLedger,
    vault: Vault,
    store: S,
    clock: C,
}

impl<S: AccountStore, C: Clock> VotingEngine<S, C> {
    pub fn new(
        admin: impl Into<String>,
        vault_address: impl Into<String>,
        stake_amount: u64,
        store: S,
        clock: C,
    ) -> Self {
        Self {
            stake_amount,
            registry: QuestionRegistry::new(admin),
            ballots: BallotLedger::new(),
            vault: Vault::new(vault_address),
            store,
            clock,
        }
    }

    pub fn from_snapshot(snapshot: EngineSnapshot, store: S, clock: C) -> Self {
        Self {
            stake_amount: snapshot.stake_amount,
            registry: snapshot.registry,
            ballots: snapshot.ballots,
            vault: snapshot.vault,
            store,
            clock,
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            stake_amount: self.stake_amount,
            registry: self.registry.clone(),
            ballots: self.ballots.clone(),
            vault: self.vault.clone(),
        }
    }

    pub fn stake_amount(&self) -> u64 {
        self.stake_amount
    }

    pub fn admin(&self) -> &str {
        self.registry.admin()
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ========================================================================
    // QUESTION REGISTRY
    // ========================================================================

    pub fn create_question(
        &mut self,
        caller: &str,
        text: impl Into<String>,
        start_time: u64,
        end_time: u64,
    ) -> Result<u64, VotingError> {
        let now = self.clock.now();
        self.registry
            .create(caller, text.into(), start_time, end_time, now)
            .map_err(|e| {
                warn!(caller, error = %e, "create question rejected");
                e
            })
    }

    pub fn close_question(&mut self, caller: &str, question_id: u64) -> Result<Resolution, VotingError> {
        let now = self.clock.now();
        self.registry
            .close(caller, question_id, now)
            .map(|q| q.resolution.clone())
            .map_err(|e| {
                warn!(caller, question_id, error = %e, "close rejected");
                e
            })
    }

    pub fn open_status(&self, question_id: u64) -> Result<QuestionStatus, VotingError> {
        self.registry.status(question_id, self.clock.now())
    }

    pub fn question(&self, question_id: u64) -> Result<QuestionView, VotingError> {
        let question = self.registry.get(question_id)?;
        Ok(self.view(question))
    }

    pub fn list_questions(&self) -> Vec<QuestionView> {
        self.registry.list().map(|q| self.view(q)).collect()
    }

    fn view(&self, question: &Question) -> QuestionView {
        QuestionView {
            id: question.id,
            text: question.text.clone(),
            start_time: question.start_time,
            end_time: question.end_time,
            status: question.status_at(self.clock.now()),
            tally: question.tally,
            ballots: self.ballots.count(question.id),
        }
    }

    // ========================================================================
    // BALLOT LEDGER
    // ========================================================================

    /// Cast a staked vote. `option` is the raw wire index (0 YES, 1 NO, 2 ABSTAIN).
    pub fn vote(&mut self, caller: &str, question_id: u64, option: i64, deposit: u64) -> Result<&Ballot, VotingError> {
        let now = self.clock.now();
        let (option, escrowed) = match self.check_vote_preconditions(caller, question_id, option, deposit, now) {
            Ok(checked) => checked,
            Err(e) => {
                warn!(caller, question_id, error = %e, "vote rejected");
                return Err(e);
            }
        };

        // Only fallible interaction; nothing has been mutated yet
        self.store.debit(caller, self.stake_amount).map_err(|e| {
            warn!(caller, question_id, error = %e, "stake debit failed");
            VotingError::TransferFailed(e)
        })?;

        self.vault.escrowed = escrowed;
        self.store.journal(TxType::Stake, caller, self.stake_amount, now);

        self.registry.get_mut(question_id)?.tally.increment(option);
        let ballot = self.ballots.record(question_id, caller, option, self.stake_amount, now)?;

        info!(question_id, voter = caller, option = %option, "vote recorded");
        Ok(ballot)
    }

    fn check_vote_preconditions(
        &self,
        caller: &str,
        question_id: u64,
        option: i64,
        deposit: u64,
        now: u64,
    ) -> Result<(VoteOption, u64), VotingError> {
        let question = self.registry.get(question_id)?;
        if !question.accepts_votes(now) {
            return Err(VotingError::QuestionNotOpen(question_id));
        }
        let option = VoteOption::from_index(option)?;
        if deposit != self.stake_amount {
            return Err(VotingError::WrongStakeAmount { expected: self.stake_amount, got: deposit });
        }
        if self.ballots.has_voted(question_id, caller) {
            return Err(VotingError::AlreadyVoted { question_id, voter: caller.to_string() });
        }
        let escrowed = self.vault.escrow_after(self.stake_amount)?;
        Ok((option, escrowed))
    }

    pub fn check_vote(&self, question_id: u64, voter: &str) -> Result<VoteCheck, VotingError> {
        self.registry.get(question_id)?;
        Ok(self.ballots.check_vote(question_id, voter))
    }

    pub fn ballots(&self, question_id: u64) -> Result<Vec<&Ballot>, VotingError> {
        self.registry.get(question_id)?;
        Ok(self.ballots.for_question(question_id))
    }

    pub fn get_yes_votes_count(&self, question_id: u64) -> Result<u64, VotingError> {
        Ok(self.registry.get(question_id)?.tally.yes)
    }

    pub fn get_no_votes_count(&self, question_id: u64) -> Result<u64, VotingError> {
        Ok(self.registry.get(question_id)?.tally.no)
    }

    pub fn get_abstain_votes_count(&self, question_id: u64) -> Result<u64, VotingError> {
        Ok(self.registry.get(question_id)?.tally.abstain)
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Frozen verdict of a closed question
    pub fn resolution(&self, question_id: u64) -> Result<&Resolution, VotingError> {
        let question = self.registry.get(question_id)?;
        if !question.is_closed() {
            return Err(VotingError::NotYetClosed(question_id));
        }
        Ok(&question.resolution)
    }

    /// True only when YES is the sole winner
    pub fn get_voting_results(&self, question_id: u64) -> Result<bool, VotingError> {
        Ok(self.resolution(question_id)?.yes_won())
    }

    pub fn is_question_draw(&self, question_id: u64) -> Result<bool, VotingError> {
        Ok(self.resolution(question_id)?.is_draw())
    }

    pub fn get_tied_options(&self, question_id: u64) -> Result<Vec<VoteOption>, VotingError> {
        Ok(self.resolution(question_id)?.tied_options())
    }

    // ========================================================================
    // SETTLEMENT
    // ========================================================================

    pub fn claim_stake(&mut self, caller: &str, question_id: u64) -> Result<ClaimReceipt, VotingError> {
        let result = self.try_claim(caller, question_id);
        if let Err(e) = &result {
            warn!(caller, question_id, error = %e, "claim rejected");
        }
        result
    }

    fn try_claim(&mut self, caller: &str, question_id: u64) -> Result<ClaimReceipt, VotingError> {
        let question = self.registry.get(question_id)?;
        if !question.is_closed() {
            return Err(VotingError::NotYetClosed(question_id));
        }

        let ballot = self.ballots.get_mut(question_id, caller).ok_or_else(|| VotingError::NoBallot {
            question_id,
            voter: caller.to_string(),
        })?;

        let now = self.clock.now();
        execute_claim(ballot, &question.resolution, &mut self.vault, &mut self.store, now)
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Balance of the vault account in the store
    pub fn vault_balance(&self) -> u64 {
        self.store.balance(&self.vault.address)
    }

    pub fn question_vault_credit(&self, question_id: u64) -> Result<u64, VotingError> {
        self.registry.get(question_id)?;
        Ok(self.vault.credited_for(question_id))
    }

    pub fn settlement_summary(&self, question_id: u64) -> Result<SettlementSummary, VotingError> {
        self.registry.get(question_id)?;
        let ballots = self.ballots.for_question(question_id);
        let total_staked: u64 = ballots.iter().map(|b| b.stake).sum();
        let outstanding: u64 = ballots.iter().filter(|b| !b.claimed).map(|b| b.stake).sum();
        let vault_credit = self.vault.credited_for(question_id);

        Ok(SettlementSummary {
            question_id,
            ballots: ballots.len(),
            claimed: ballots.iter().filter(|b| b.claimed).count(),
            total_staked,
            paid_out: total_staked - outstanding - vault_credit,
            vault_credit,
            outstanding,
        })
    }
}
