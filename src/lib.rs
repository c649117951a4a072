//! SUB Ledger Library
//! # Overview
//!
//! A small banking ledger for "SUB - Sistema Único de Bancos": people, banks, the
//! accounts people hold at banks, and the deposits, withdrawals and transfers
//! between them. The whole state is saved to and loaded from snapshot files.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Person, Bank, Cpf, Transaction, errors)
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Existence and uniqueness rules plus the transaction executor
//!   - [`core::transaction_store`] - Executed transactions and random id allocation
//!   - [`core::traits`] - Clock and id sources
//! - [`io`] - Snapshots, text reports and CSV export
//! - [`cli`] - CLI arguments parsing
//! - [`app`] - Dispatch of one CLI command to the ledger
//!
//! # Transaction Types
//!
//! - **Deposit**: Credit funds to an account and the bank's vault
//! - **Withdrawal**: Debit funds from an account, subject to its limits when limited
//! - **Transfer**: Debit one account and credit another; transfers between different
//!   banks pay the origin bank's fee
//!
//! A failed transaction leaves the ledger untouched and is never stored. Successful
//! ones get a random nine-digit id.
//!
//! # Account Limits
//!
//! A limited account cannot withdraw more than its night cap (50,000 by default)
//! between 21:00 and 04:00, nor more than its day cap (100,000) at any hour.

pub mod app;
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{Ledger, TransactionStore};
pub use io::{write_accounts_csv, Snapshot, SnapshotStore};
pub use types::{
    Account, Bank, Cpf, ErrorKind, LedgerError, Person, Transaction, TransactionId,
    TransactionKind, TransactionType,
};
