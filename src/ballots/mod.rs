// ============================================================================
// Ballot Ledger - one staked ballot per (question, voter)
// ============================================================================
//
// Ballots are created once at vote time and mutated once at claim time
// (the `claimed` flag). They are never deleted.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::errors::VotingError;

/// The three fixed options, in wire order 0, 1, 2
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoteOption {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "ABSTAIN")]
    Abstain,
}

impl VoteOption {
    pub const ALL: [VoteOption; 3] = [VoteOption::Yes, VoteOption::No, VoteOption::Abstain];

    /// Map a wire index to an option; anything outside 0..=2 is rejected
    pub fn from_index(raw: i64) -> Result<Self, VotingError> {
        match raw {
            0 => Ok(VoteOption::Yes),
            1 => Ok(VoteOption::No),
            2 => Ok(VoteOption::Abstain),
            other => Err(VotingError::InvalidOption(other)),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            VoteOption::Yes => 0,
            VoteOption::No => 1,
            VoteOption::Abstain => 2,
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoteOption::Yes => "YES",
            VoteOption::No => "NO",
            VoteOption::Abstain => "ABSTAIN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ballot {
    pub question_id: u64,

    pub voter: String,

    pub option: VoteOption,

    /// Deposit held for this ballot
    pub stake: u64,

    /// Flipped to true exactly once, by a successful claim
    pub claimed: bool,

    pub cast_at: u64,

    /// sha256(question_id | voter | option | cast_at), hex encoded
    pub receipt: String,
}

impl Ballot {
    fn new(question_id: u64, voter: &str, option: VoteOption, stake: u64, cast_at: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(question_id.to_be_bytes());
        hasher.update(voter.as_bytes());
        hasher.update([option.index()]);
        hasher.update(cast_at.to_be_bytes());

        Self {
            question_id,
            voter: voter.to_string(),
            option,
            stake,
            claimed: false,
            cast_at,
            receipt: hex::encode(hasher.finalize()),
        }
    }
}

/// Answer of `check_vote`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteCheck {
    pub has_voted: bool,
    pub option: Option<VoteOption>,
}

/// All ballots, keyed by question then voter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotLedger {
    ballots: HashMap<u64, BTreeMap<String, Ballot>>,
}

impl BallotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, question_id: u64, voter: &str) -> bool {
        self.get(question_id, voter).is_some()
    }

    pub fn get(&self, question_id: u64, voter: &str) -> Option<&Ballot> {
        self.ballots.get(&question_id)?.get(voter)
    }

    pub(crate) fn get_mut(&mut self, question_id: u64, voter: &str) -> Option<&mut Ballot> {
        self.ballots.get_mut(&question_id)?.get_mut(voter)
    }

    /// Record a ballot. Fails if the voter already has one for this question.
    pub(crate) fn record(
        &mut self,
        question_id: u64,
        voter: &str,
        option: VoteOption,
        stake: u64,
        cast_at: u64,
    ) -> Result<&Ballot, VotingError> {
        let per_question = self.ballots.entry(question_id).or_default();
        if per_question.contains_key(voter) {
            return Err(VotingError::AlreadyVoted { question_id, voter: voter.to_string() });
        }

        let ballot = per_question
            .entry(voter.to_string())
            .or_insert_with(|| Ballot::new(question_id, voter, option, stake, cast_at));
        Ok(&*ballot)
    }

    pub fn check_vote(&self, question_id: u64, voter: &str) -> VoteCheck {
        match self.get(question_id, voter) {
            Some(ballot) => VoteCheck { has_voted: true, option: Some(ballot.option) },
            None => VoteCheck { has_voted: false, option: None },
        }
    }

    /// Ballots of one question, ordered by voter address
    pub fn for_question(&self, question_id: u64) -> Vec<&Ballot> {
        self.ballots
            .get(&question_id)
            .map(|m| m.values().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, question_id: u64) -> usize {
        self.ballots.get(&question_id).map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_index_roundtrip_and_rejects_unknown() {
        for option in VoteOption::ALL {
            assert_eq!(VoteOption::from_index(option.index().into()).unwrap(), option);
        }
        assert_eq!(VoteOption::from_index(3), Err(VotingError::InvalidOption(3)));
        assert_eq!(VoteOption::from_index(256), Err(VotingError::InvalidOption(256)));
        assert_eq!(VoteOption::from_index(-1), Err(VotingError::InvalidOption(-1)));
    }

    #[test]
    fn test_one_ballot_per_voter() {
        let mut ledger = BallotLedger::new();
        ledger.record(1, "0xALICE", VoteOption::Yes, 100, 10).unwrap();

        let err = ledger.record(1, "0xALICE", VoteOption::No, 100, 11).unwrap_err();
        assert_eq!(err, VotingError::AlreadyVoted { question_id: 1, voter: "0xALICE".into() });
        assert_eq!(ledger.get(1, "0xALICE").unwrap().option, VoteOption::Yes);

        // Same voter, different question is fine
        ledger.record(2, "0xALICE", VoteOption::No, 100, 12).unwrap();
        assert_eq!(ledger.count(1), 1);
        assert_eq!(ledger.count(2), 1);
    }

    #[test]
    fn test_check_vote() {
        let mut ledger = BallotLedger::new();
        ledger.record(1, "0xBOB", VoteOption::Abstain, 100, 10).unwrap();

        assert_eq!(
            ledger.check_vote(1, "0xBOB"),
            VoteCheck { has_voted: true, option: Some(VoteOption::Abstain) }
        );
        assert_eq!(ledger.check_vote(1, "0xCAROL"), VoteCheck { has_voted: false, option: None });
    }

    #[test]
    fn test_receipt_is_hex_sha256() {
        let mut ledger = BallotLedger::new();
        let ballot = ledger.record(7, "0xDAVE", VoteOption::No, 100, 99).unwrap();
        assert_eq!(ballot.receipt.len(), 64);
        assert!(!ballot.claimed);
    }
}
