//! Bank type
//!
//! A bank holds a vault balance, a fee for transfers to other banks, and the set of
//! cpfs registered as its clients. Clients are kept by key only; the accounts
//! themselves belong to each Person.

use super::cpf::Cpf;
use super::error::LedgerError;
use super::person::Person;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Vault balance every new bank starts with
pub const INITIAL_VAULT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    /// Trimmed, unique bank name
    pub name: String,

    /// Fraction charged on transfers to a different bank (0.01 = 1%)
    pub fee: Decimal,

    /// Bank-wide float balance
    pub vault: Decimal,

    clients: BTreeSet<Cpf>,
}

impl Bank {
    pub fn new(name: &str, fee: Decimal) -> Self {
        Bank {
            name: name.trim().to_string(),
            fee,
            vault: INITIAL_VAULT,
            clients: BTreeSet::new(),
        }
    }

    /// Rebuild a bank from stored parts
    pub(crate) fn from_parts(
        name: String,
        fee: Decimal,
        vault: Decimal,
        clients: BTreeSet<Cpf>,
    ) -> Self {
        Bank {
            name,
            fee,
            vault,
            clients,
        }
    }

    /// Open an account for `person` at this bank
    ///
    /// The person's account is created first; the client registration only happens
    /// once that succeeds.
    ///
    /// # Errors
    ///
    /// `AccountAlreadyExists` if the person already banks here.
    pub fn open_account(
        &mut self,
        person: &mut Person,
        initial_value: Decimal,
    ) -> Result<(), LedgerError> {
        person.open_account(&self.name, initial_value)?;
        self.clients.insert(person.cpf);
        Ok(())
    }

    /// Close `person`'s account at this bank
    ///
    /// # Errors
    ///
    /// `AccountNonExistent` if the person is not a client here.
    pub fn close_account(&mut self, person: &mut Person) -> Result<(), LedgerError> {
        if !self.clients.contains(&person.cpf) {
            return Err(LedgerError::account_non_existent(person.cpf, &self.name));
        }

        person.close_account(&self.name)?;
        self.clients.remove(&person.cpf);
        Ok(())
    }

    pub fn is_client(&self, cpf: Cpf) -> bool {
        self.clients.contains(&cpf)
    }

    pub fn clients(&self) -> impl Iterator<Item = Cpf> + '_ {
        self.clients.iter().copied()
    }

    /// Number of registered clients; must be zero before the bank can be removed
    pub fn clients_amount(&self) -> usize {
        self.clients.len()
    }

    /// Fee as a percentage, for display; `None` if it does not fit in a `Decimal`
    pub fn fee_percent(&self) -> Option<Decimal> {
        self.fee.checked_mul(Decimal::ONE_HUNDRED)
    }

    pub fn credit_vault(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.vault = self
            .vault
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("vault credit"))?;
        Ok(())
    }

    pub fn debit_vault(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.vault = self
            .vault
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("vault debit"))?;
        Ok(())
    }
}
