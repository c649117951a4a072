//! Transaction storage
//!
//! Keeps every executed transaction under its id and allocates fresh ids. An id
//! stays reserved for as long as its transaction is stored.

use crate::core::traits::IdSource;
use crate::types::{LedgerError, Transaction, TransactionId};
use std::collections::BTreeMap;
use tracing::debug;

/// Executed transactions keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionStore {
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        TransactionStore {
            transactions: BTreeMap::new(),
        }
    }

    /// Draw candidates from `ids` until one is unused
    ///
    /// Assumes the id space is not exhausted.
    pub fn allocate_id(&self, ids: &mut dyn IdSource) -> TransactionId {
        loop {
            let candidate = ids.next_candidate();
            if !self.transactions.contains_key(&candidate) {
                return candidate;
            }
            debug!(candidate, "transaction id collision, drawing again");
        }
    }

    /// Store `transaction` under a freshly allocated id and return the id
    ///
    /// The id is also written into the stored transaction.
    pub fn store(&mut self, mut transaction: Transaction, ids: &mut dyn IdSource) -> TransactionId {
        let id = self.allocate_id(ids);
        transaction.id = Some(id);
        self.transactions.insert(id, transaction);
        id
    }

    /// Store a transaction that already carries its id (snapshot restore)
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` if the id is missing or already taken.
    pub fn restore(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        let id = transaction
            .id
            .ok_or_else(|| LedgerError::corrupt_snapshot("stored transaction without id"))?;
        if self.transactions.contains_key(&id) {
            return Err(LedgerError::corrupt_snapshot(format!(
                "duplicate transaction id {id}"
            )));
        }
        self.transactions.insert(id, transaction);
        Ok(())
    }

    pub fn get(&self, id: TransactionId) -> Result<&Transaction, LedgerError> {
        self.transactions
            .get(&id)
            .ok_or_else(|| LedgerError::transaction_non_existent(id))
    }

    pub fn contains(&self, id: TransactionId) -> bool {
        self.transactions.contains_key(&id)
    }

    /// Transactions in id order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
