// ============================================================================
// Question Registry - lifecycle of time-boxed questions
// ============================================================================
//
// A question is created Pending, is Open while start <= now < end, and is
// Closed only by an explicit administrator action once its window is over.
// The only persisted lifecycle flag is `closed_at`; everything else is
// derived from the clock on read.
//
//   Pending --(now >= start)--> Open --(now >= end)--> Ended --close()--> Closed
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::ballots::VoteOption;
use crate::errors::VotingError;
use crate::resolution::{resolve, Resolution};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "open")]
    Open,
    /// Window elapsed, close not recorded yet
    #[serde(rename = "ended")]
    Ended,
    #[serde(rename = "closed")]
    Closed,
}

/// Vote counts per option
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
}

impl Tally {
    pub fn new(yes: u64, no: u64, abstain: u64) -> Self {
        Self { yes, no, abstain }
    }

    pub fn count(&self, option: VoteOption) -> u64 {
        match option {
            VoteOption::Yes => self.yes,
            VoteOption::No => self.no,
            VoteOption::Abstain => self.abstain,
        }
    }

    pub fn increment(&mut self, option: VoteOption) {
        match option {
            VoteOption::Yes => self.yes += 1,
            VoteOption::No => self.no += 1,
            VoteOption::Abstain => self.abstain += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Sequential id, starting at 1
    pub id: u64,

    /// Question text
    pub text: String,

    /// Voting opens at this instant (inclusive)
    pub start_time: u64,

    /// Voting stops at this instant (exclusive)
    pub end_time: u64,

    /// Creation timestamp
    pub created_at: u64,

    /// Set once by close(); never cleared
    pub closed_at: Option<u64>,

    /// Mutated only while the question is open
    pub tally: Tally,

    /// Verdict frozen at close time
    pub resolution: Resolution,
}

impl Question {
    /// Pure function of the clock, the window and the close flag
    pub fn status_at(&self, now: u64) -> QuestionStatus {
        if self.closed_at.is_some() {
            QuestionStatus::Closed
        } else if now < self.start_time {
            QuestionStatus::Pending
        } else if now < self.end_time {
            QuestionStatus::Open
        } else {
            QuestionStatus::Ended
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn accepts_votes(&self, now: u64) -> bool {
        self.status_at(now) == QuestionStatus::Open
    }
}

/// Owns every question and the id sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRegistry {
    admin: String,
    questions: BTreeMap<u64, Question>,
    next_id: u64,
}

impl QuestionRegistry {
    pub fn new(admin: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
            questions: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    fn authorize(&self, caller: &str) -> Result<(), VotingError> {
        if caller != self.admin {
            return Err(VotingError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Register a new question and return its id
    pub fn create(
        &mut self,
        caller: &str,
        text: String,
        start_time: u64,
        end_time: u64,
        now: u64,
    ) -> Result<u64, VotingError> {
        self.authorize(caller)?;

        if start_time >= end_time || start_time < now {
            return Err(VotingError::InvalidWindow { start_time, end_time, now });
        }

        let id = self.next_id;
        self.next_id += 1;

        self.questions.insert(
            id,
            Question {
                id,
                text,
                start_time,
                end_time,
                created_at: now,
                closed_at: None,
                tally: Tally::default(),
                resolution: Resolution::Unresolved,
            },
        );

        info!(question_id = id, start_time, end_time, "question created");
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Result<&Question, VotingError> {
        self.questions.get(&id).ok_or(VotingError::QuestionNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut Question, VotingError> {
        self.questions.get_mut(&id).ok_or(VotingError::QuestionNotFound(id))
    }

    pub fn status(&self, id: u64, now: u64) -> Result<QuestionStatus, VotingError> {
        Ok(self.get(id)?.status_at(now))
    }

    /// Close a question whose window has elapsed and freeze its verdict
    pub fn close(&mut self, caller: &str, id: u64, now: u64) -> Result<&Question, VotingError> {
        self.authorize(caller)?;

        let question = self.get_mut(id)?;
        if question.is_closed() {
            return Err(VotingError::AlreadyClosed(id));
        }
        if now < question.end_time {
            return Err(VotingError::NotYetEndable { question_id: id, end_time: question.end_time, now });
        }

        question.closed_at = Some(now);
        question.resolution = resolve(&question.tally);

        info!(question_id = id, resolution = ?question.resolution, "question closed");
        Ok(&*question)
    }

    pub fn list(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "0xADMIN";

    #[test]
    fn test_sequential_ids() {
        let mut registry = QuestionRegistry::new(ADMIN);
        let a = registry.create(ADMIN, "A?".into(), 100, 200, 50).unwrap();
        let b = registry.create(ADMIN, "B?".into(), 100, 200, 50).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_window() {
        let mut registry = QuestionRegistry::new(ADMIN);
        assert!(matches!(
            registry.create(ADMIN, "inverted".into(), 200, 100, 50),
            Err(VotingError::InvalidWindow { .. })
        ));
        assert!(matches!(
            registry.create(ADMIN, "empty".into(), 200, 200, 50),
            Err(VotingError::InvalidWindow { .. })
        ));
        assert!(matches!(
            registry.create(ADMIN, "past".into(), 40, 100, 50),
            Err(VotingError::InvalidWindow { .. })
        ));
        // A failed create does not burn an id
        assert_eq!(registry.create(ADMIN, "ok".into(), 50, 100, 50).unwrap(), 1);
    }

    #[test]
    fn test_create_requires_admin() {
        let mut registry = QuestionRegistry::new(ADMIN);
        assert_eq!(
            registry.create("0xMALLORY", "?".into(), 100, 200, 50),
            Err(VotingError::Unauthorized("0xMALLORY".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_status_derivation() {
        let mut registry = QuestionRegistry::new(ADMIN);
        let id = registry.create(ADMIN, "?".into(), 100, 200, 0).unwrap();

        assert_eq!(registry.status(id, 99).unwrap(), QuestionStatus::Pending);
        assert_eq!(registry.status(id, 100).unwrap(), QuestionStatus::Open);
        assert_eq!(registry.status(id, 199).unwrap(), QuestionStatus::Open);
        assert_eq!(registry.status(id, 200).unwrap(), QuestionStatus::Ended);

        registry.close(ADMIN, id, 250).unwrap();
        assert_eq!(registry.status(id, 250).unwrap(), QuestionStatus::Closed);
        // Closed is terminal, whatever the clock says
        assert_eq!(registry.status(id, 150).unwrap(), QuestionStatus::Closed);
    }

    #[test]
    fn test_close_rules() {
        let mut registry = QuestionRegistry::new(ADMIN);
        let id = registry.create(ADMIN, "?".into(), 100, 200, 0).unwrap();

        assert!(matches!(
            registry.close(ADMIN, id, 199),
            Err(VotingError::NotYetEndable { question_id: 1, end_time: 200, now: 199 })
        ));
        assert_eq!(
            registry.close("0xMALLORY", id, 300).unwrap_err(),
            VotingError::Unauthorized("0xMALLORY".into())
        );
        assert_eq!(registry.close(ADMIN, 42, 300).unwrap_err(), VotingError::QuestionNotFound(42));

        registry.close(ADMIN, id, 200).unwrap();
        assert_eq!(registry.close(ADMIN, id, 300).unwrap_err(), VotingError::AlreadyClosed(id));
    }

    #[test]
    fn test_close_freezes_resolution() {
        let mut registry = QuestionRegistry::new(ADMIN);
        let id = registry.create(ADMIN, "?".into(), 100, 200, 0).unwrap();
        registry.get_mut(id).unwrap().tally = Tally::new(3, 2, 1);

        let question = registry.close(ADMIN, id, 200).unwrap();
        assert_eq!(question.resolution, Resolution::WinnerDecided(VoteOption::Yes));
    }
}
