// ============================================================================
// Stake Claim
// ============================================================================
//
// A claim runs in three steps:
//
//   1. CHECK    - ballot unclaimed, question resolved
//   2. EFFECTS  - mark the ballot claimed, release its stake from escrow,
//                 record the question's vault credit
//   3. TRANSFER - credit the vault share to the vault account, then the
//                 payout to the voter, through the account store
//
// Steps 2 and 3 run inside a PendingClaim. If a transfer fails the guard is
// dropped uncommitted and every effect of step 2 is reverted; a vault credit
// already applied is debited back. The voter can claim again later.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{payout_for, PayoutKind, PayoutSplit, Vault};
use crate::ballots::{Ballot, VoteOption};
use crate::errors::VotingError;
use crate::ledger::{AccountStore, LedgerError, TxType};
use crate::resolution::Resolution;

/// Result of a successful claim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub question_id: u64,
    pub voter: String,
    pub option: VoteOption,
    pub kind: PayoutKind,
    pub payout: u64,
    pub vault_share: u64,
}

/// Scoped effects of a claim, reverted on drop unless committed
struct PendingClaim<'a> {
    ballot: &'a mut Ballot,
    vault: &'a mut Vault,
    split: PayoutSplit,
    committed: bool,
}

impl<'a> PendingClaim<'a> {
    fn begin(ballot: &'a mut Ballot, vault: &'a mut Vault, split: PayoutSplit) -> Result<Self, VotingError> {
        let escrowed = vault.escrowed.checked_sub(ballot.stake).ok_or_else(|| {
            VotingError::TransferFailed(LedgerError::InsufficientFunds {
                address: vault.address.clone(),
                available: vault.escrowed,
                requested: ballot.stake,
            })
        })?;
        let credited = vault
            .credited_for(ballot.question_id)
            .checked_add(split.vault_share)
            .ok_or_else(|| VotingError::TransferFailed(LedgerError::Overflow(vault.address.clone())))?;

        ballot.claimed = true;
        vault.escrowed = escrowed;
        if split.vault_share > 0 {
            vault.credited.insert(ballot.question_id, credited);
        }

        Ok(Self { ballot, vault, split, committed: false })
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingClaim<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        self.ballot.claimed = false;
        self.vault.escrowed += self.ballot.stake;
        if self.split.vault_share > 0 {
            if let Some(credited) = self.vault.credited.get_mut(&self.ballot.question_id) {
                *credited -= self.split.vault_share;
            }
        }
    }
}

/// Settle one ballot against a frozen verdict
///
/// # Arguments
/// * `ballot` - The caller's ballot
/// * `resolution` - The question's verdict
/// * `vault` - The engine's vault record
/// * `store` - Account store holding the voter and vault accounts
/// * `now` - Timestamp for the journal entries
pub fn execute_claim<S>(
    ballot: &mut Ballot,
    resolution: &Resolution,
    vault: &mut Vault,
    store: &mut S,
    now: u64,
) -> Result<ClaimReceipt, VotingError>
where
    S: AccountStore + ?Sized,
{
    if ballot.claimed {
        return Err(VotingError::AlreadyClaimed {
            question_id: ballot.question_id,
            voter: ballot.voter.clone(),
        });
    }

    let split = payout_for(ballot.question_id, resolution, ballot.option, ballot.stake)?;
    let question_id = ballot.question_id;
    let voter = ballot.voter.clone();
    let option = ballot.option;
    let vault_address = vault.address.clone();

    let pending = PendingClaim::begin(ballot, vault, split)?;

    if split.vault_share > 0 {
        if let Err(e) = store.credit(&vault_address, split.vault_share) {
            warn!(question_id, vault = %vault_address, error = %e, "vault credit failed, claim rolled back");
            return Err(VotingError::TransferFailed(e));
        }
    }

    if let Err(e) = store.credit(&voter, split.payout) {
        warn!(question_id, voter = %voter, error = %e, "payout transfer failed, claim rolled back");
        if split.vault_share > 0 {
            if let Err(undo) = store.debit(&vault_address, split.vault_share) {
                error!(question_id, vault = %vault_address, error = %undo, "vault credit could not be reversed");
                return Err(VotingError::TransferFailed(undo));
            }
        }
        return Err(VotingError::TransferFailed(e));
    }
    pending.commit();

    store.journal(TxType::Payout, &voter, split.payout, now);
    if split.vault_share > 0 {
        store.journal(TxType::VaultCredit, &vault_address, split.vault_share, now);
    }

    info!(question_id, voter = %voter, payout = split.payout, vault_share = split.vault_share, "stake claimed");

    Ok(ClaimReceipt {
        question_id,
        voter,
        option,
        kind: split.kind,
        payout: split.payout,
        vault_share: split.vault_share,
    })
}
