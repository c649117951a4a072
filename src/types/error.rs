//! Error types for the SUB ledger
//!
//! This module defines every error a ledger operation can report. Each failure is
//! local to the operation that raised it: the ledger is left exactly as it was
//! before the call, and nothing is retried.
//!
//! # Error Categories
//!
//! - **Validation**: empty fields, malformed numbers or cpfs, negative amounts
//! - **Existence**: a referenced person, bank, account or transaction is missing
//! - **Business rule**: insufficient funds, withdrawal limits, duplicates, non-empty banks
//! - **Persistence**: invalid snapshot path, I/O and (de)serialization failures

use super::cpf::Cpf;
use super::transaction::TransactionId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse grouping of [`LedgerError`] variants
///
/// Front ends use this to pick how a failure is presented: validation and
/// business-rule errors are warnings about the submitted data, existence errors
/// point at a wrong reference, persistence errors offer a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Existence,
    BusinessRule,
    Persistence,
}

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// A required field was left empty
    #[error("Field '{field}' must not be empty")]
    EmptyField { field: String },

    /// A numeric field could not be parsed
    #[error("Invalid number '{value}' for field '{field}'")]
    InvalidNumber { field: String, value: String },

    /// A cpf field is not a valid 11-digit identifier
    #[error("Invalid cpf '{value}'")]
    InvalidCpf { value: String },

    /// An amount that must be non-negative was negative
    #[error("Negative amount {amount} is not allowed for {operation}")]
    NegativeAmount { amount: Decimal, operation: String },

    #[error("Person with cpf {cpf} not found")]
    PersonNonExistent { cpf: Cpf },

    #[error("Bank '{name}' not found")]
    BankNonExistent { name: String },

    /// The person holds no account at the given bank
    #[error("Person with cpf {cpf} has no account at bank '{bank}'")]
    AccountNonExistent { cpf: Cpf, bank: String },

    #[error("Transaction #{id:09} not found")]
    TransactionNonExistent { id: TransactionId },

    #[error("Person with cpf {cpf} is already registered")]
    DuplicatePerson { cpf: Cpf },

    #[error("Bank '{name}' is already registered")]
    DuplicateBank { name: String },

    /// One account per bank per person
    #[error("Person with cpf {cpf} already has an account at bank '{bank}'")]
    AccountAlreadyExists { cpf: Cpf, bank: String },

    /// Bank removal while clients still hold accounts there
    #[error("Bank '{name}' still has {clients} client(s)")]
    BankNotEmpty { name: String, clients: usize },

    /// Withdrawal larger than the account balance
    ///
    /// The account is left unchanged.
    #[error("Insufficient funds: balance {balance:.2}, requested {requested:.2}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    /// Limited withdrawal above the night cap during the night window
    #[error("Withdrawal of {requested:.2} exceeds the night limit of {limit:.2}")]
    NightLimitExceeded { requested: Decimal, limit: Decimal },

    /// Limited withdrawal above the day cap
    #[error("Withdrawal of {requested:.2} exceeds the daily limit of {limit:.2}")]
    DayLimitExceeded { requested: Decimal, limit: Decimal },

    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: String },

    /// Snapshot paths must carry the `.syss` extension
    #[error("Invalid snapshot file '{path}': select a file named like \"SAVE_dd-mm-yyyy_hh-mm.syss\"")]
    InvalidSnapshotPath { path: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A decoded snapshot breaks a ledger invariant
    #[error("Corrupt snapshot: {message}")]
    CorruptSnapshot { message: String },
}

impl LedgerError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::EmptyField { .. }
            | LedgerError::InvalidNumber { .. }
            | LedgerError::InvalidCpf { .. }
            | LedgerError::NegativeAmount { .. } => ErrorKind::Validation,
            LedgerError::PersonNonExistent { .. }
            | LedgerError::BankNonExistent { .. }
            | LedgerError::AccountNonExistent { .. }
            | LedgerError::TransactionNonExistent { .. } => ErrorKind::Existence,
            LedgerError::DuplicatePerson { .. }
            | LedgerError::DuplicateBank { .. }
            | LedgerError::AccountAlreadyExists { .. }
            | LedgerError::BankNotEmpty { .. }
            | LedgerError::InsufficientFunds { .. }
            | LedgerError::NightLimitExceeded { .. }
            | LedgerError::DayLimitExceeded { .. }
            | LedgerError::ArithmeticOverflow { .. } => ErrorKind::BusinessRule,
            LedgerError::InvalidSnapshotPath { .. }
            | LedgerError::Io { .. }
            | LedgerError::Serialization { .. }
            | LedgerError::CorruptSnapshot { .. } => ErrorKind::Persistence,
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        LedgerError::Serialization {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    pub fn empty_field(field: &str) -> Self {
        LedgerError::EmptyField {
            field: field.to_string(),
        }
    }

    pub fn invalid_number(field: &str, value: &str) -> Self {
        LedgerError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn invalid_cpf(value: &str) -> Self {
        LedgerError::InvalidCpf {
            value: value.to_string(),
        }
    }

    pub fn negative_amount(amount: Decimal, operation: &str) -> Self {
        LedgerError::NegativeAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    pub fn person_non_existent(cpf: Cpf) -> Self {
        LedgerError::PersonNonExistent { cpf }
    }

    pub fn bank_non_existent(name: &str) -> Self {
        LedgerError::BankNonExistent {
            name: name.to_string(),
        }
    }

    pub fn account_non_existent(cpf: Cpf, bank: &str) -> Self {
        LedgerError::AccountNonExistent {
            cpf,
            bank: bank.to_string(),
        }
    }

    pub fn transaction_non_existent(id: TransactionId) -> Self {
        LedgerError::TransactionNonExistent { id }
    }

    pub fn duplicate_person(cpf: Cpf) -> Self {
        LedgerError::DuplicatePerson { cpf }
    }

    pub fn duplicate_bank(name: &str) -> Self {
        LedgerError::DuplicateBank {
            name: name.to_string(),
        }
    }

    pub fn account_already_exists(cpf: Cpf, bank: &str) -> Self {
        LedgerError::AccountAlreadyExists {
            cpf,
            bank: bank.to_string(),
        }
    }

    pub fn bank_not_empty(name: &str, clients: usize) -> Self {
        LedgerError::BankNotEmpty {
            name: name.to_string(),
            clients,
        }
    }

    pub fn insufficient_funds(balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds { balance, requested }
    }

    pub fn night_limit_exceeded(requested: Decimal, limit: Decimal) -> Self {
        LedgerError::NightLimitExceeded { requested, limit }
    }

    pub fn day_limit_exceeded(requested: Decimal, limit: Decimal) -> Self {
        LedgerError::DayLimitExceeded { requested, limit }
    }

    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    pub fn invalid_snapshot_path(path: &str) -> Self {
        LedgerError::InvalidSnapshotPath {
            path: path.to_string(),
        }
    }

    pub fn corrupt_snapshot(message: impl Into<String>) -> Self {
        LedgerError::CorruptSnapshot {
            message: message.into(),
        }
    }
}
