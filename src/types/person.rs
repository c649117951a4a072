//! Person type
//!
//! A person is keyed by cpf and holds at most one account per bank.

use super::account::Account;
use super::cpf::Cpf;
use super::error::LedgerError;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A registered person
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Display name, normalized by [`normalize_name`]
    pub name: String,

    pub cpf: Cpf,

    /// Accounts keyed by bank name
    accounts: BTreeMap<String, Account>,
}

/// Trim the name and capitalize it: first character upper case, the rest lower case
pub fn normalize_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

impl Person {
    /// Create a person without accounts
    pub fn new(name: &str, cpf: Cpf) -> Self {
        Person {
            name: normalize_name(name),
            cpf,
            accounts: BTreeMap::new(),
        }
    }

    /// Open an account at `bank_name` with an opening balance
    ///
    /// # Errors
    ///
    /// `AccountAlreadyExists` if the person already holds an account at that bank.
    pub fn open_account(
        &mut self,
        bank_name: &str,
        initial_value: Decimal,
    ) -> Result<&mut Account, LedgerError> {
        if self.accounts.contains_key(bank_name) {
            return Err(LedgerError::account_already_exists(self.cpf, bank_name));
        }

        Ok(self
            .accounts
            .entry(bank_name.to_string())
            .or_insert_with(|| Account::new(initial_value)))
    }

    /// Close the account at `bank_name`, returning it
    ///
    /// # Errors
    ///
    /// `AccountNonExistent` if there is no account at that bank.
    pub fn close_account(&mut self, bank_name: &str) -> Result<Account, LedgerError> {
        self.accounts
            .remove(bank_name)
            .ok_or_else(|| LedgerError::account_non_existent(self.cpf, bank_name))
    }

    /// Put back a stored account as-is (snapshot restore)
    pub(crate) fn restore_account(
        &mut self,
        bank_name: &str,
        account: Account,
    ) -> Result<(), LedgerError> {
        if self.accounts.contains_key(bank_name) {
            return Err(LedgerError::account_already_exists(self.cpf, bank_name));
        }
        self.accounts.insert(bank_name.to_string(), account);
        Ok(())
    }

    pub fn account(&self, bank_name: &str) -> Result<&Account, LedgerError> {
        self.accounts
            .get(bank_name)
            .ok_or_else(|| LedgerError::account_non_existent(self.cpf, bank_name))
    }

    pub fn account_mut(&mut self, bank_name: &str) -> Result<&mut Account, LedgerError> {
        let cpf = self.cpf;
        self.accounts
            .get_mut(bank_name)
            .ok_or_else(|| LedgerError::account_non_existent(cpf, bank_name))
    }

    pub fn has_account(&self, bank_name: &str) -> bool {
        self.accounts.contains_key(bank_name)
    }

    /// Accounts in bank-name order
    pub fn accounts(&self) -> impl Iterator<Item = (&str, &Account)> {
        self.accounts.iter().map(|(bank, account)| (bank.as_str(), account))
    }

    /// Names of the banks where this person holds an account
    pub fn bank_names(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of balances across all accounts
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the sum does not fit in a `Decimal`.
    pub fn total_funds(&self) -> Result<Decimal, LedgerError> {
        checked_sum(self.accounts.values().map(|account| account.balance), "total funds")
    }

    /// Mean score across all accounts, `None` without accounts
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the summed scores do not fit in a `Decimal`.
    pub fn mean_score(&self) -> Result<Option<Decimal>, LedgerError> {
        if self.accounts.is_empty() {
            return Ok(None);
        }
        let scores = self.accounts.values().map(|account| account.score);
        let total = checked_sum(scores, "mean score")?;
        total
            .checked_div(Decimal::from(self.accounts.len()))
            .map(Some)
            .ok_or_else(|| LedgerError::arithmetic_overflow("mean score"))
    }
}

fn checked_sum(
    mut values: impl Iterator<Item = Decimal>,
    operation: &str,
) -> Result<Decimal, LedgerError> {
    values.try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation))
    })
}
