//! Read-only text views of the ledger
//!
//! Each report borrows the ledger and renders through `Display`, so callers can
//! print it or collect it into a string.

use crate::core::Ledger;
use crate::types::{Cpf, LedgerError, Person, Transaction, TransactionId, TransactionKind};
use rust_decimal::Decimal;
use std::fmt;

/// A derived figure with two fraction digits, or `overflow` when it could not be computed
pub struct Figure {
    value: Option<Decimal>,
    suffix: &'static str,
}

impl Figure {
    pub fn new(value: Option<Decimal>) -> Self {
        Figure { value, suffix: "" }
    }

    pub fn percent(value: Option<Decimal>) -> Self {
        Figure { value, suffix: "%" }
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{:.2}{}", value, self.suffix),
            None => f.write_str("overflow"),
        }
    }
}

/// People and banks registered in the system
pub struct StatusReport<'a> {
    ledger: &'a Ledger,
}

impl<'a> StatusReport<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        StatusReport { ledger }
    }
}

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let people_amount = self.ledger.people().count();
        let bank_amount = self.ledger.banks().count();

        writeln!(
            f,
            "The system has {} {} and {} {}.",
            people_amount,
            if people_amount == 1 { "registered person" } else { "registered people" },
            bank_amount,
            if bank_amount == 1 { "registered bank" } else { "registered banks" },
        )?;

        writeln!(f)?;
        if people_amount == 0 {
            writeln!(f, "There are no people registered.")?;
        } else {
            writeln!(f, "People:")?;
            for person in self.ledger.people() {
                writeln!(f, "\t{} - CPF: {}", person.name, person.cpf)?;
            }
        }

        writeln!(f)?;
        if bank_amount == 0 {
            writeln!(f, "There are no banks registered.")?;
        } else {
            writeln!(f, "Banks:")?;
            for bank in self.ledger.banks() {
                writeln!(f, "\t{} - fee: {}", bank.name, Figure::percent(bank.fee_percent()))?;
            }
        }
        Ok(())
    }
}

/// One person's accounts and totals
pub struct PersonReport<'a> {
    person: &'a Person,
}

impl<'a> PersonReport<'a> {
    /// # Errors
    ///
    /// `PersonNonExistent` if `cpf` is not registered.
    pub fn new(ledger: &'a Ledger, cpf: Cpf) -> Result<Self, LedgerError> {
        Ok(PersonReport {
            person: ledger.get_person(cpf)?,
        })
    }
}

impl fmt::Display for PersonReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let person = self.person;
        writeln!(f, "Data for '{}' (CPF: {}):", person.name, person.cpf)?;

        if person.account_count() == 0 {
            return writeln!(f, "\t{} has no accounts.", person.name);
        }

        for (bank, account) in person.accounts() {
            writeln!(
                f,
                "\tBalance at {}: R$ {:.2}; score: {:.2}{}",
                bank,
                account.balance,
                account.score,
                if account.is_limited { " (limited)" } else { "" },
            )?;
        }
        writeln!(f, "\tTotal funds: R$ {}", Figure::new(person.total_funds().ok()))?;
        writeln!(f, "\tMean score: {}", Figure::new(person.mean_score().ok().flatten()))
    }
}

/// One stored transaction with its parties resolved to names
pub struct TransactionReport<'a> {
    ledger: &'a Ledger,
    transaction: &'a Transaction,
}

impl<'a> TransactionReport<'a> {
    /// # Errors
    ///
    /// `TransactionNonExistent` if `id` is not stored.
    pub fn new(ledger: &'a Ledger, id: TransactionId) -> Result<Self, LedgerError> {
        Ok(TransactionReport {
            ledger,
            transaction: ledger.get_transaction(id)?,
        })
    }

    fn party(&self, f: &mut fmt::Formatter<'_>, role: &str, cpf: Cpf, bank: &str) -> fmt::Result {
        let name = self
            .ledger
            .get_person(cpf)
            .map(|person| person.name.as_str())
            .unwrap_or("(removed)");
        writeln!(f, "{role}: {name} (CPF: {cpf}) at {bank}")
    }
}

impl fmt::Display for TransactionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = self.transaction;
        match tx.id {
            Some(id) => writeln!(f, "Transaction #{id:09}")?,
            None => writeln!(f, "Transaction (pending)")?,
        }
        match tx.date {
            Some(date) => writeln!(f, "Date: {}", date.format("%d/%m/%Y %H:%M:%S"))?,
            None => writeln!(f, "Date: ---")?,
        }
        writeln!(f, "Value: R$ {:.2}", tx.value)?;
        writeln!(f, "Type: {}", tx.transaction_type())?;
        writeln!(f, "Succeeded: {}", if tx.succeeded { "yes" } else { "no" })?;

        match &tx.kind {
            TransactionKind::Deposit { depositor, bank } => {
                self.party(f, "Depositor", *depositor, bank)
            }
            TransactionKind::Withdrawal {
                withdrawer, bank, ..
            } => self.party(f, "Withdrawer", *withdrawer, bank),
            TransactionKind::Transfer {
                withdrawer,
                origin_bank,
                receiver,
                target_bank,
                ..
            } => {
                self.party(f, "From", *withdrawer, origin_bank)?;
                self.party(f, "To", *receiver, target_bank)
            }
        }
    }
}
