/// Account Ledger for the staked voting engine
///
/// Holds native balances for voters and the vault account. The engine only
/// needs two primitives from it, "debit caller" and "credit address", each
/// of which either fully applies or fails without touching any balance.
///
/// KEY FEATURES:
/// - Exact integer balances (no rounding anywhere)
/// - Append-only transaction journal
/// - Accounts can be frozen to make the store refuse transfers

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

// ============================================================================
// ACCOUNT STORE SEAM
// ============================================================================

/// Minimal account primitives the engine depends on
pub trait AccountStore {
    /// Spendable balance, zero for unknown accounts
    fn balance(&self, address: &str) -> u64;

    /// Remove `amount` from `address`. All-or-nothing.
    fn debit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError>;

    /// Add `amount` to `address`, creating the account if needed. All-or-nothing.
    fn credit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError>;

    /// Note a completed movement at `timestamp`. Stores without a journal ignore it.
    fn journal(&mut self, _tx_type: TxType, _address: &str, _amount: u64, _timestamp: u64) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InsufficientFunds { address: String, available: u64, requested: u64 },
    AccountFrozen(String),
    Overflow(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::InsufficientFunds { address, available, requested } => write!(
                f,
                "Insufficient funds for {}: have {}, need {}",
                address, available, requested
            ),
            LedgerError::AccountFrozen(address) => write!(f, "Account frozen: {}", address),
            LedgerError::Overflow(address) => write!(f, "Balance overflow for {}", address),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// CORE TYPES
// ============================================================================

/// Transaction types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxType {
    Deposit,
    Stake,
    Payout,
    VaultCredit,
}

/// A single journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub tx_type: TxType,
    pub address: String,
    pub amount: u64,
    pub timestamp: u64,
}

impl Transaction {
    pub fn new(tx_type: TxType, address: &str, amount: u64, timestamp: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tx_type,
            address: address.to_string(),
            amount,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    pub accounts: usize,
    pub transactions: usize,
    pub deposited: u64,
    pub staked: u64,
    pub paid_out: u64,
    pub vault_credited: u64,
}

// ============================================================================
// LEDGER
// ============================================================================

/// In-memory account store with a transaction journal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Account balances (address -> units)
    pub balances: HashMap<String, u64>,
    /// Accounts the store refuses to move funds for
    #[serde(default)]
    pub frozen: HashSet<String>,
    /// All transactions, oldest first
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account from outside the engine (the driver's job)
    pub fn fund(&mut self, address: &str, amount: u64) -> Result<u64, LedgerError> {
        self.apply_credit(address, amount)?;
        self.transactions.push(Transaction::new(TxType::Deposit, address, amount, now()));
        info!(address, amount, "account funded");
        Ok(self.balance(address))
    }

    pub fn freeze(&mut self, address: &str) {
        self.frozen.insert(address.to_string());
    }

    pub fn unfreeze(&mut self, address: &str) {
        self.frozen.remove(address);
    }

    pub fn is_frozen(&self, address: &str) -> bool {
        self.frozen.contains(address)
    }

    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(limit).collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let sum = |kind: TxType| -> u64 {
            self.transactions
                .iter()
                .filter(|t| t.tx_type == kind)
                .map(|t| t.amount)
                .sum()
        };

        LedgerStats {
            accounts: self.balances.len(),
            transactions: self.transactions.len(),
            deposited: sum(TxType::Deposit),
            staked: sum(TxType::Stake),
            paid_out: sum(TxType::Payout),
            vault_credited: sum(TxType::VaultCredit),
        }
    }

    fn apply_credit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError> {
        if self.is_frozen(address) {
            return Err(LedgerError::AccountFrozen(address.to_string()));
        }
        let current = self.balances.get(address).copied().unwrap_or(0);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(address.to_string()))?;
        self.balances.insert(address.to_string(), updated);
        Ok(())
    }
}

impl AccountStore for Ledger {
    fn balance(&self, address: &str) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn debit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError> {
        if self.is_frozen(address) {
            return Err(LedgerError::AccountFrozen(address.to_string()));
        }
        let available = self.balance(address);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                address: address.to_string(),
                available,
                requested: amount,
            });
        }
        self.balances.insert(address.to_string(), available - amount);
        debug!(address, amount, "debit");
        Ok(())
    }

    fn credit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError> {
        self.apply_credit(address, amount)?;
        debug!(address, amount, "credit");
        Ok(())
    }

    fn journal(&mut self, tx_type: TxType, address: &str, amount: u64, timestamp: u64) {
        self.transactions.push(Transaction::new(tx_type, address, amount, timestamp));
    }
}

/// Wall-clock time for deposits made outside the engine
fn now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
