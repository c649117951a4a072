//! Core business logic module
//!
//! This module contains the ledger and its supporting components:
//! - `traits` - Clock and transaction id sources
//! - `ledger` - People, banks, accounts and the transaction executor
//! - `transaction_store` - Executed transactions and id allocation

pub mod ledger;
pub mod traits;
pub mod transaction_store;

pub use ledger::Ledger;
pub use traits::{Clock, FixedClock, IdSource, RandomIds, SequenceIds, SystemClock};
pub use transaction_store::TransactionStore;
