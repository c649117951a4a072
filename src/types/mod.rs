//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account balance, score and withdrawal limits
//! - `bank`: Banks, their vaults and client registrations
//! - `cpf`: The person identifier
//! - `person`: People and their per-bank accounts
//! - `transaction`: Transaction variants and identifiers
//! - `error`: Error types for the ledger

pub mod account;
pub mod bank;
pub mod cpf;
pub mod error;
pub mod person;
pub mod transaction;

pub use account::Account;
pub use bank::Bank;
pub use cpf::Cpf;
pub use error::{ErrorKind, LedgerError};
pub use person::Person;
pub use transaction::{
    Transaction, TransactionId, TransactionKind, TransactionType, MAX_TRANSACTION_ID,
};
