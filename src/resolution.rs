// ============================================================================
// Resolution - plurality verdict over a frozen tally
// ============================================================================
//
// maxCount = max(yes, no, abstain)
// winners  = every option whose count == maxCount
//
//   |winners| == 1  -> WinnerDecided(option)
//   |winners| >= 2  -> Draw(winners)        (0/0/0 is a three-way draw)
//
// The verdict is a pure function of the tally, so recomputing it always
// yields the cached value.
//
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::ballots::VoteOption;
use crate::questions::Tally;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "options")]
pub enum Resolution {
    /// Question not closed yet
    Unresolved,
    WinnerDecided(VoteOption),
    /// Options sharing the maximum count, in YES, NO, ABSTAIN order
    Draw(Vec<VoteOption>),
}

pub fn resolve(tally: &Tally) -> Resolution {
    let max_count = VoteOption::ALL
        .iter()
        .map(|option| tally.count(*option))
        .max()
        .unwrap_or(0);

    let winners: Vec<VoteOption> = VoteOption::ALL
        .into_iter()
        .filter(|option| tally.count(*option) == max_count)
        .collect();

    match winners.as_slice() {
        [single] => Resolution::WinnerDecided(*single),
        _ => Resolution::Draw(winners),
    }
}

impl Resolution {
    pub fn is_draw(&self) -> bool {
        matches!(self, Resolution::Draw(_))
    }

    pub fn winner(&self) -> Option<VoteOption> {
        match self {
            Resolution::WinnerDecided(option) => Some(*option),
            _ => None,
        }
    }

    /// Tied options for a draw, empty otherwise
    pub fn tied_options(&self) -> Vec<VoteOption> {
        match self {
            Resolution::Draw(options) => options.clone(),
            _ => Vec::new(),
        }
    }

    /// True only when YES is the sole winner. A NO win, an ABSTAIN win and
    /// any draw all report false.
    pub fn yes_won(&self) -> bool {
        self.winner() == Some(VoteOption::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_winners() {
        assert_eq!(resolve(&Tally::new(3, 2, 1)), Resolution::WinnerDecided(VoteOption::Yes));
        assert_eq!(resolve(&Tally::new(2, 3, 1)), Resolution::WinnerDecided(VoteOption::No));
        assert_eq!(resolve(&Tally::new(1, 1, 4)), Resolution::WinnerDecided(VoteOption::Abstain));
    }

    #[test]
    fn test_three_way_draw() {
        let all = vec![VoteOption::Yes, VoteOption::No, VoteOption::Abstain];
        assert_eq!(resolve(&Tally::new(2, 2, 2)), Resolution::Draw(all.clone()));
        assert_eq!(resolve(&Tally::new(0, 0, 0)), Resolution::Draw(all));
    }

    #[test]
    fn test_two_way_draw_ignores_trailing_option() {
        let verdict = resolve(&Tally::new(3, 3, 1));
        assert!(verdict.is_draw());
        assert_eq!(verdict.tied_options(), vec![VoteOption::Yes, VoteOption::No]);

        let verdict = resolve(&Tally::new(0, 2, 2));
        assert_eq!(verdict.tied_options(), vec![VoteOption::No, VoteOption::Abstain]);
    }

    #[test]
    fn test_single_vote_wins() {
        assert_eq!(resolve(&Tally::new(0, 0, 1)), Resolution::WinnerDecided(VoteOption::Abstain));
    }

    #[test]
    fn test_yes_won_is_narrow() {
        assert!(resolve(&Tally::new(3, 2, 1)).yes_won());
        assert!(!resolve(&Tally::new(2, 3, 1)).yes_won());
        assert!(!resolve(&Tally::new(1, 1, 4)).yes_won());
        assert!(!resolve(&Tally::new(2, 2, 2)).yes_won());
        assert!(!Resolution::Unresolved.yes_won());
    }

    #[test]
    fn test_recomputation_is_stable() {
        let tally = Tally::new(4, 4, 0);
        assert_eq!(resolve(&tally), resolve(&tally));
    }
}
