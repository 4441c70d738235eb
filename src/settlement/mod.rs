// ============================================================================
// Settlement - paying out staked ballots once a question closes
// ============================================================================
//
// Payout rules for a ballot with stake S:
//
//   Draw                          -> voter S,     vault 0
//   Winner, voter picked winner   -> voter S,     vault 0
//   Winner, voter picked a loser  -> voter S/2,   vault S - S/2
//
// For every closed question:
//   sum(voter payouts) + vault credit == S * ballots
//
// ============================================================================

pub mod claim;

pub use claim::{execute_claim, ClaimReceipt};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ballots::VoteOption;
use crate::errors::VotingError;
use crate::ledger::LedgerError;
use crate::resolution::Resolution;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PayoutKind {
    DrawRefund,
    WinnerRefund,
    LoserHalf,
}

/// How one stake is divided between the voter and the vault
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutSplit {
    pub kind: PayoutKind,
    pub payout: u64,
    pub vault_share: u64,
}

pub fn payout_for(
    question_id: u64,
    resolution: &Resolution,
    option: VoteOption,
    stake: u64,
) -> Result<PayoutSplit, VotingError> {
    let split = match resolution {
        Resolution::Unresolved => return Err(VotingError::NotYetClosed(question_id)),
        Resolution::Draw(_) => PayoutSplit { kind: PayoutKind::DrawRefund, payout: stake, vault_share: 0 },
        Resolution::WinnerDecided(winner) if *winner == option => {
            PayoutSplit { kind: PayoutKind::WinnerRefund, payout: stake, vault_share: 0 }
        }
        Resolution::WinnerDecided(_) => {
            let payout = stake / 2;
            PayoutSplit { kind: PayoutKind::LoserHalf, payout, vault_share: stake - payout }
        }
    };
    Ok(split)
}

/// Engine-owned record of stakes in custody and of what each question has
/// credited to the vault account. The vault's funds live in the account
/// store under `address`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vault {
    /// Account credited with forfeited shares (the administrator's own)
    pub address: String,

    /// Stakes held for ballots not claimed yet
    pub escrowed: u64,

    /// Lifetime vault credit per question
    pub credited: BTreeMap<u64, u64>,
}

impl Vault {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), ..Default::default() }
    }

    /// Escrow total after taking custody of `amount`, without applying it
    pub(crate) fn escrow_after(&self, amount: u64) -> Result<u64, VotingError> {
        self.escrowed
            .checked_add(amount)
            .ok_or_else(|| VotingError::TransferFailed(LedgerError::Overflow(self.address.clone())))
    }

    pub fn credited_for(&self, question_id: u64) -> u64 {
        self.credited.get(&question_id).copied().unwrap_or(0)
    }

    pub fn total_credited(&self) -> u64 {
        self.credited.values().sum()
    }
}

/// Settlement progress of one question
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementSummary {
    pub question_id: u64,
    pub ballots: usize,
    pub claimed: usize,
    pub total_staked: u64,
    pub paid_out: u64,
    pub vault_credit: u64,
    /// Stake still held for unclaimed ballots
    pub outstanding: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_refunds_everyone() {
        let draw = Resolution::Draw(VoteOption::ALL.to_vec());
        for option in VoteOption::ALL {
            let split = payout_for(1, &draw, option, 100).unwrap();
            assert_eq!(split, PayoutSplit { kind: PayoutKind::DrawRefund, payout: 100, vault_share: 0 });
        }
    }

    #[test]
    fn test_winner_and_loser_split() {
        let verdict = Resolution::WinnerDecided(VoteOption::No);

        let winner = payout_for(1, &verdict, VoteOption::No, 100).unwrap();
        assert_eq!((winner.payout, winner.vault_share), (100, 0));

        let loser = payout_for(1, &verdict, VoteOption::Abstain, 100).unwrap();
        assert_eq!(loser.kind, PayoutKind::LoserHalf);
        assert_eq!((loser.payout, loser.vault_share), (50, 50));
    }

    #[test]
    fn test_odd_stake_keeps_conservation() {
        let verdict = Resolution::WinnerDecided(VoteOption::Yes);
        let loser = payout_for(1, &verdict, VoteOption::No, 101).unwrap();
        assert_eq!(loser.payout, 50);
        assert_eq!(loser.vault_share, 51);
        assert_eq!(loser.payout + loser.vault_share, 101);
    }

    #[test]
    fn test_escrow_overflow_detected_up_front() {
        let mut vault = Vault::new("0xVAULT");
        vault.escrowed = u64::MAX - 50;

        assert_eq!(vault.escrow_after(50).unwrap(), u64::MAX);
        assert_eq!(
            vault.escrow_after(100),
            Err(VotingError::TransferFailed(LedgerError::Overflow("0xVAULT".into())))
        );
        assert_eq!(vault.escrowed, u64::MAX - 50);
    }

    #[test]
    fn test_unresolved_cannot_pay() {
        assert_eq!(
            payout_for(4, &Resolution::Unresolved, VoteOption::Yes, 100),
            Err(VotingError::NotYetClosed(4))
        );
    }
}
