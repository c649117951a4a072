//! The ledger
//!
//! This module provides the `Ledger`, which owns every person, bank and executed
//! transaction. It is the only authority for existence and uniqueness checks, and
//! it runs all transaction variants through a single executor.
//!
//! The ledger enforces:
//! - One person per cpf, one bank per name, one account per (person, bank)
//! - No bank removal while clients remain
//! - No mutation on failure: every operation either applies completely or leaves
//!   the ledger untouched
//! - Ids only for successful transactions, never reused while stored

use crate::core::traits::{Clock, IdSource, RandomIds, SystemClock};
use crate::core::transaction_store::TransactionStore;
use crate::types::{
    Account, Bank, Cpf, LedgerError, Person, Transaction, TransactionId, TransactionKind,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// People, banks and transactions of one SUB system
pub struct Ledger {
    people: BTreeMap<Cpf, Person>,
    banks: BTreeMap<String, Bank>,
    transactions: TransactionStore,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
}

impl Ledger {
    /// Create an empty ledger on the local clock with random transaction ids
    pub fn new() -> Self {
        Self::with_sources(Box::new(SystemClock), Box::new(RandomIds::new()))
    }

    /// Create an empty ledger with explicit time and id sources
    pub fn with_sources(clock: Box<dyn Clock>, ids: Box<dyn IdSource>) -> Self {
        Ledger {
            people: BTreeMap::new(),
            banks: BTreeMap::new(),
            transactions: TransactionStore::new(),
            clock,
            ids,
        }
    }

    /// Rebuild a ledger from stored parts, checking every cross-reference
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` on duplicate keys, accounts at unknown banks, or client
    /// registrations that do not match the people's accounts.
    pub fn restore(
        people: Vec<Person>,
        banks: Vec<Bank>,
        transactions: Vec<Transaction>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Ledger::new();

        for bank in banks {
            if ledger.banks.contains_key(&bank.name) {
                return Err(LedgerError::corrupt_snapshot(format!(
                    "duplicate bank '{}'",
                    bank.name
                )));
            }
            ledger.banks.insert(bank.name.clone(), bank);
        }

        for person in people {
            if ledger.people.contains_key(&person.cpf) {
                return Err(LedgerError::corrupt_snapshot(format!(
                    "duplicate person {}",
                    person.cpf
                )));
            }
            for (bank_name, _) in person.accounts() {
                let registered = ledger
                    .banks
                    .get(bank_name)
                    .is_some_and(|bank| bank.is_client(person.cpf));
                if !registered {
                    return Err(LedgerError::corrupt_snapshot(format!(
                        "account of {} at '{}' has no matching bank registration",
                        person.cpf, bank_name
                    )));
                }
            }
            ledger.people.insert(person.cpf, person);
        }

        for bank in ledger.banks.values() {
            for cpf in bank.clients() {
                let holds_account = ledger
                    .people
                    .get(&cpf)
                    .is_some_and(|person| person.has_account(&bank.name));
                if !holds_account {
                    return Err(LedgerError::corrupt_snapshot(format!(
                        "bank '{}' lists client {} without an account",
                        bank.name, cpf
                    )));
                }
            }
        }

        for transaction in transactions {
            ledger.transactions.restore(transaction)?;
        }

        Ok(ledger)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ---------------------------------------------------------------------
    // People
    // ---------------------------------------------------------------------

    /// Register a person
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `DuplicatePerson` if the cpf is already registered
    pub fn add_person(&mut self, name: &str, cpf: Cpf) -> Result<&Person, LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::empty_field("name"));
        }
        if self.people.contains_key(&cpf) {
            return Err(LedgerError::duplicate_person(cpf));
        }

        let person = self.people.entry(cpf).or_insert_with(|| Person::new(name, cpf));
        info!(cpf = %person.cpf, name = %person.name, "person registered");
        Ok(person)
    }

    /// Remove a person, closing every account they hold first
    ///
    /// # Errors
    ///
    /// `PersonNonExistent` if the cpf is not registered.
    pub fn remove_person(&mut self, cpf: Cpf) -> Result<Person, LedgerError> {
        let person = self
            .people
            .get_mut(&cpf)
            .ok_or_else(|| LedgerError::person_non_existent(cpf))?;

        for bank_name in person.bank_names() {
            match self.banks.get_mut(&bank_name) {
                Some(bank) => bank.close_account(person)?,
                None => {
                    person.close_account(&bank_name)?;
                }
            }
        }

        let removed = self
            .people
            .remove(&cpf)
            .ok_or_else(|| LedgerError::person_non_existent(cpf))?;
        info!(cpf = %cpf, name = %removed.name, "person removed");
        Ok(removed)
    }

    pub fn get_person(&self, cpf: Cpf) -> Result<&Person, LedgerError> {
        self.people
            .get(&cpf)
            .ok_or_else(|| LedgerError::person_non_existent(cpf))
    }

    pub fn person_exists(&self, cpf: Cpf) -> bool {
        self.people.contains_key(&cpf)
    }

    /// People in cpf order
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    // ---------------------------------------------------------------------
    // Banks
    // ---------------------------------------------------------------------

    /// Register a bank with a fractional transfer fee (0.01 = 1%)
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `NegativeAmount` if the fee is negative
    /// - `DuplicateBank` if the name is already registered
    pub fn add_bank(&mut self, name: &str, fee: Decimal) -> Result<&Bank, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::empty_field("name"));
        }
        if fee < Decimal::ZERO {
            return Err(LedgerError::negative_amount(fee, "bank fee"));
        }
        if self.banks.contains_key(name) {
            return Err(LedgerError::duplicate_bank(name));
        }

        let bank = self
            .banks
            .entry(name.to_string())
            .or_insert_with(|| Bank::new(name, fee));
        info!(bank = %bank.name, fee = %bank.fee, "bank registered");
        Ok(bank)
    }

    /// Remove a bank without clients
    ///
    /// # Errors
    ///
    /// - `BankNonExistent` if the name is not registered
    /// - `BankNotEmpty` if any person still holds an account there
    pub fn remove_bank(&mut self, name: &str) -> Result<Bank, LedgerError> {
        let bank = self.get_bank(name)?;
        if bank.clients_amount() != 0 {
            return Err(LedgerError::bank_not_empty(&bank.name, bank.clients_amount()));
        }

        let removed = self
            .banks
            .remove(name)
            .ok_or_else(|| LedgerError::bank_non_existent(name))?;
        info!(bank = %removed.name, "bank removed");
        Ok(removed)
    }

    pub fn get_bank(&self, name: &str) -> Result<&Bank, LedgerError> {
        self.banks
            .get(name)
            .ok_or_else(|| LedgerError::bank_non_existent(name))
    }

    pub fn bank_exists(&self, name: &str) -> bool {
        self.banks.contains_key(name)
    }

    /// Banks in name order
    pub fn banks(&self) -> impl Iterator<Item = &Bank> {
        self.banks.values()
    }

    // ---------------------------------------------------------------------
    // Accounts
    // ---------------------------------------------------------------------

    /// Open an account for `cpf` at `bank_name`
    ///
    /// # Errors
    ///
    /// `PersonNonExistent`, `BankNonExistent`, `NegativeAmount` for a negative
    /// opening balance, or `AccountAlreadyExists`.
    pub fn open_account(
        &mut self,
        cpf: Cpf,
        bank_name: &str,
        initial_value: Decimal,
    ) -> Result<(), LedgerError> {
        if initial_value < Decimal::ZERO {
            return Err(LedgerError::negative_amount(initial_value, "account opening"));
        }
        let person = self
            .people
            .get_mut(&cpf)
            .ok_or_else(|| LedgerError::person_non_existent(cpf))?;
        let bank = self
            .banks
            .get_mut(bank_name)
            .ok_or_else(|| LedgerError::bank_non_existent(bank_name))?;

        bank.open_account(person, initial_value)?;
        info!(cpf = %cpf, bank = %bank_name, "account opened");
        Ok(())
    }

    /// Close the account `cpf` holds at `bank_name`
    ///
    /// # Errors
    ///
    /// `PersonNonExistent`, `BankNonExistent` or `AccountNonExistent`.
    pub fn close_account(&mut self, cpf: Cpf, bank_name: &str) -> Result<(), LedgerError> {
        let person = self
            .people
            .get_mut(&cpf)
            .ok_or_else(|| LedgerError::person_non_existent(cpf))?;
        let bank = self
            .banks
            .get_mut(bank_name)
            .ok_or_else(|| LedgerError::bank_non_existent(bank_name))?;

        bank.close_account(person)?;
        info!(cpf = %cpf, bank = %bank_name, "account closed");
        Ok(())
    }

    /// Turn the time-of-day and daily withdrawal caps on or off for one account
    pub fn set_account_limit(
        &mut self,
        cpf: Cpf,
        bank_name: &str,
        limited: bool,
    ) -> Result<(), LedgerError> {
        self.account_mut(cpf, bank_name)?.set_limited(limited);
        info!(cpf = %cpf, bank = %bank_name, limited, "account limit changed");
        Ok(())
    }

    /// Look up the account `cpf` holds at `bank_name`
    pub fn get_account(&self, cpf: Cpf, bank_name: &str) -> Result<&Account, LedgerError> {
        self.get_bank(bank_name)?;
        self.get_person(cpf)?.account(bank_name)
    }

    fn account_mut(&mut self, cpf: Cpf, bank_name: &str) -> Result<&mut Account, LedgerError> {
        self.get_bank(bank_name)?;
        self.people
            .get_mut(&cpf)
            .ok_or_else(|| LedgerError::person_non_existent(cpf))?
            .account_mut(bank_name)
    }

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    /// Build a pending deposit into `cpf`'s account at `bank_name`
    ///
    /// A negative `value` is clamped to zero.
    pub fn new_deposit(
        &self,
        cpf: Cpf,
        bank_name: &str,
        value: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.get_account(cpf, bank_name)?;
        Ok(Transaction::pending(
            value.max(Decimal::ZERO),
            TransactionKind::Deposit {
                depositor: cpf,
                bank: bank_name.to_string(),
            },
        ))
    }

    /// Build a pending withdrawal from `cpf`'s account at `bank_name`
    ///
    /// A negative `value` is clamped to zero. The account's limit flag is captured now.
    pub fn new_withdrawal(
        &self,
        cpf: Cpf,
        bank_name: &str,
        value: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let account = self.get_account(cpf, bank_name)?;
        Ok(Transaction::pending(
            value.max(Decimal::ZERO),
            TransactionKind::Withdrawal {
                withdrawer: cpf,
                bank: bank_name.to_string(),
                limited: account.is_limited,
            },
        ))
    }

    /// Build a pending transfer between two accounts
    ///
    /// # Errors
    ///
    /// `NegativeAmount` for a negative value, or an existence error if either
    /// account cannot be resolved.
    pub fn new_transfer(
        &self,
        withdrawer: Cpf,
        origin_bank: &str,
        receiver: Cpf,
        target_bank: &str,
        value: Decimal,
    ) -> Result<Transaction, LedgerError> {
        if value < Decimal::ZERO {
            return Err(LedgerError::negative_amount(value, "transfer"));
        }
        let source = self.get_account(withdrawer, origin_bank)?;
        self.get_account(receiver, target_bank)?;

        Ok(Transaction::pending(
            value,
            TransactionKind::Transfer {
                withdrawer,
                origin_bank: origin_bank.to_string(),
                receiver,
                target_bank: target_bank.to_string(),
                limited: source.is_limited,
            },
        ))
    }

    /// Amount a pending transaction will debit, fee included
    pub fn taxed_value(&self, transaction: &Transaction) -> Result<Decimal, LedgerError> {
        let fee = match &transaction.kind {
            TransactionKind::Transfer { origin_bank, .. } => self.get_bank(origin_bank)?.fee,
            _ => Decimal::ZERO,
        };
        transaction
            .taxed_value(fee)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer fee"))
    }

    /// Execute a pending transaction
    ///
    /// On success the transaction is dated, marked succeeded, stored under a fresh
    /// id, and the id is returned. On failure the transaction is dropped and the
    /// ledger is exactly as it was.
    pub fn execute(&mut self, mut transaction: Transaction) -> Result<TransactionId, LedgerError> {
        let now = self.clock.now();

        let result = match transaction.kind.clone() {
            TransactionKind::Deposit { depositor, bank } => {
                self.apply_deposit(depositor, &bank, transaction.value)
            }
            TransactionKind::Withdrawal {
                withdrawer,
                bank,
                limited,
            } => self.apply_withdrawal(withdrawer, &bank, transaction.value, limited, now),
            TransactionKind::Transfer {
                withdrawer,
                origin_bank,
                receiver,
                target_bank,
                limited,
            } => {
                transaction.date = Some(now);
                let value = transaction.value;
                self.taxed_value(&transaction).and_then(|taxed_value| {
                    self.apply_transfer(
                        (withdrawer, &origin_bank),
                        (receiver, &target_bank),
                        value,
                        taxed_value,
                        limited,
                        now,
                    )
                })
            }
        };

        match result {
            Ok(()) => {
                transaction.date = Some(now);
                transaction.succeeded = true;
                let tx_type = transaction.transaction_type();
                let value = transaction.value;
                let id = self.add_transaction(transaction);
                info!(id, %tx_type, %value, "transaction executed");
                Ok(id)
            }
            Err(error) => {
                warn!(
                    tx_type = %transaction.transaction_type(),
                    value = %transaction.value,
                    %error,
                    "transaction rejected"
                );
                Err(error)
            }
        }
    }

    /// Store a transaction under a freshly allocated, unused id
    pub fn add_transaction(&mut self, transaction: Transaction) -> TransactionId {
        self.transactions.store(transaction, self.ids.as_mut())
    }

    pub fn get_transaction(&self, id: TransactionId) -> Result<&Transaction, LedgerError> {
        self.transactions.get(id)
    }

    /// Executed transactions in id order
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    fn apply_deposit(&mut self, cpf: Cpf, bank_name: &str, value: Decimal) -> Result<(), LedgerError> {
        let mut account = self.get_account(cpf, bank_name)?.clone();
        account.deposit(value)?;
        let vault = self.staged_vault(bank_name, value)?;

        *self.account_mut(cpf, bank_name)? = account;
        self.commit_vault(bank_name, vault)
    }

    fn apply_withdrawal(
        &mut self,
        cpf: Cpf,
        bank_name: &str,
        value: Decimal,
        limited: bool,
        now: NaiveDateTime,
    ) -> Result<(), LedgerError> {
        let mut account = self.get_account(cpf, bank_name)?.clone();
        account.withdraw(value, limited, now.time())?;
        let vault = self.staged_vault(bank_name, -value)?;

        *self.account_mut(cpf, bank_name)? = account;
        self.commit_vault(bank_name, vault)
    }

    /// Debit `taxed_value` from the source, credit `value` to the destination
    ///
    /// Vaults: the origin loses `value` and keeps the fee, the target gains `value`.
    fn apply_transfer(
        &mut self,
        (withdrawer, origin_bank): (Cpf, &str),
        (receiver, target_bank): (Cpf, &str),
        value: Decimal,
        taxed_value: Decimal,
        limited: bool,
        now: NaiveDateTime,
    ) -> Result<(), LedgerError> {
        let same_account = withdrawer == receiver && origin_bank == target_bank;

        let mut source = self.get_account(withdrawer, origin_bank)?.clone();
        source.withdraw(taxed_value, limited, now.time())?;

        let mut destination = if same_account {
            None
        } else {
            Some(self.get_account(receiver, target_bank)?.clone())
        };
        match destination.as_mut() {
            Some(account) => account.deposit(value)?,
            None => source.deposit(value)?,
        };

        let fee = taxed_value - value;
        let (origin_vault, target_vault) = if origin_bank == target_bank {
            (self.staged_vault(origin_bank, fee)?, None)
        } else {
            (
                self.staged_vault(origin_bank, fee - value)?,
                Some(self.staged_vault(target_bank, value)?),
            )
        };

        *self.account_mut(withdrawer, origin_bank)? = source;
        if let Some(account) = destination {
            *self.account_mut(receiver, target_bank)? = account;
        }
        self.commit_vault(origin_bank, origin_vault)?;
        if let Some(vault) = target_vault {
            self.commit_vault(target_bank, vault)?;
        }
        Ok(())
    }

    /// Vault balance of `bank_name` after moving `delta`, without applying it
    fn staged_vault(&self, bank_name: &str, delta: Decimal) -> Result<Decimal, LedgerError> {
        let mut bank = self.get_bank(bank_name)?.clone();
        if delta.is_sign_negative() {
            bank.debit_vault(-delta)?;
        } else {
            bank.credit_vault(delta)?;
        }
        Ok(bank.vault)
    }

    fn commit_vault(&mut self, bank_name: &str, vault: Decimal) -> Result<(), LedgerError> {
        self.banks
            .get_mut(bank_name)
            .ok_or_else(|| LedgerError::bank_non_existent(bank_name))?
            .vault = vault;
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("people", &self.people)
            .field("banks", &self.banks)
            .field("transactions", &self.transactions)
            .finish_non_exhaustive()
    }
}

/// Ledgers are equal when their data is; clock and id source are ignored
impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.people == other.people
            && self.banks == other.banks
            && self.transactions == other.transactions
    }
}
