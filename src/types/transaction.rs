//! Transaction-related types for the SUB ledger
//!
//! A transaction is plain data: its value, its outcome, and a tagged variant naming
//! the people and banks involved by key. The ledger runs every variant through one
//! executor, see [`crate::core::ledger::Ledger::execute`].

use super::cpf::Cpf;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier
///
/// Allocated at random in `0..=MAX_TRANSACTION_ID` and displayed as nine digits.
pub type TransactionId = u32;

/// Largest allocatable transaction id
pub const MAX_TRANSACTION_ID: TransactionId = 999_999_999;

/// Transaction types supported by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Credit funds to one account
    Deposit,

    /// Debit funds from one account, subject to its limits
    Withdrawal,

    /// Debit one account and credit another, with a fee across banks
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
        };
        f.write_str(label)
    }
}

/// Parties involved in a transaction, by key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit {
        depositor: Cpf,
        bank: String,
    },
    Withdrawal {
        withdrawer: Cpf,
        bank: String,
        /// Source account's `is_limited` flag when the withdrawal was built
        limited: bool,
    },
    Transfer {
        withdrawer: Cpf,
        origin_bank: String,
        receiver: Cpf,
        target_bank: String,
        /// Source account's `is_limited` flag when the transfer was built
        limited: bool,
    },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Deposit { .. } => TransactionType::Deposit,
            TransactionKind::Withdrawal { .. } => TransactionType::Withdrawal,
            TransactionKind::Transfer { .. } => TransactionType::Transfer,
        }
    }

    /// Whether a transfer crosses banks and therefore pays the origin fee
    pub fn is_inter_bank(&self) -> bool {
        match self {
            TransactionKind::Transfer {
                origin_bank,
                target_bank,
                ..
            } => origin_bank != target_bank,
            _ => false,
        }
    }
}

/// A monetary operation against the ledger
///
/// Built pending (no id, no date, `succeeded == false`). Executing it is terminal:
/// on success the ledger stamps it, assigns an id and stores it; on failure it is
/// dropped and never receives an id.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Assigned by the ledger when the transaction is stored
    pub id: Option<TransactionId>,

    /// Amount requested (before any transfer fee)
    pub value: Decimal,

    /// Execution timestamp (local time)
    pub date: Option<NaiveDateTime>,

    pub succeeded: bool,

    pub kind: TransactionKind,
}

impl Transaction {
    /// Create a pending transaction
    pub fn pending(value: Decimal, kind: TransactionKind) -> Self {
        Transaction {
            id: None,
            value,
            date: None,
            succeeded: false,
            kind,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    pub fn is_pending(&self) -> bool {
        self.id.is_none() && !self.succeeded
    }

    /// Amount debited from the source account for a given origin fee
    ///
    /// `value + fee * value` for a transfer between different banks, otherwise
    /// `value`. `None` on overflow.
    pub fn taxed_value(&self, origin_fee: Decimal) -> Option<Decimal> {
        if self.kind.is_inter_bank() {
            origin_fee
                .checked_mul(self.value)
                .and_then(|fee| self.value.checked_add(fee))
        } else {
            Some(self.value)
        }
    }
}
