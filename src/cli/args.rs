use crate::types::{Cpf, LedgerError, TransactionId};
use clap::{ArgAction, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// SUB: a single system for people, banks and their accounts
#[derive(Parser, Debug)]
#[command(name = "sub")]
#[command(about = "Manage people, banks, accounts and transfers in a SUB ledger", long_about = None)]
pub struct CliArgs {
    /// Existing snapshot to load; the session saves back to it
    #[arg(long, global = true, value_name = "FILE.syss")]
    pub snapshot: Option<PathBuf>,

    /// Directory for new snapshots when no --snapshot is given
    #[arg(
        long = "saves-dir",
        global = true,
        env = "SUB_SAVES_DIR",
        value_name = "DIR",
        default_value = "saves"
    )]
    pub saves_dir: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        global = true,
        env = "SUB_LOG_LEVEL",
        value_name = "LEVEL",
        default_value = "warn"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// One operation against the ledger
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Register a person
    AddPerson {
        #[arg(long, value_parser = parse_name)]
        name: String,
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
    },

    /// Remove a person and close all their accounts
    RemovePerson {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
    },

    /// Register a bank
    AddBank {
        #[arg(long, value_parser = parse_name)]
        name: String,
        /// Fee on transfers to other banks, in percent
        #[arg(long, value_parser = parse_percent, default_value = "0")]
        fee: Decimal,
    },

    /// Remove a bank without clients
    RemoveBank {
        #[arg(long, value_parser = parse_bank)]
        name: String,
    },

    /// Open an account for a person at a bank
    OpenAccount {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
        #[arg(long, value_parser = parse_bank)]
        bank: String,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        initial: Decimal,
    },

    /// Close a person's account at a bank
    CloseAccount {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
        #[arg(long, value_parser = parse_bank)]
        bank: String,
    },

    /// Turn the withdrawal caps of an account on or off
    SetLimit {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
        #[arg(long, value_parser = parse_bank)]
        bank: String,
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        limited: bool,
    },

    /// Deposit into an account
    Deposit {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
        #[arg(long, value_parser = parse_bank)]
        bank: String,
        #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
        amount: Decimal,
    },

    /// Withdraw from an account
    Withdraw {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
        #[arg(long, value_parser = parse_bank)]
        bank: String,
        #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
        amount: Decimal,
    },

    /// Transfer between two accounts
    Transfer {
        #[arg(long = "from-cpf", value_parser = parse_cpf)]
        from_cpf: Cpf,
        #[arg(long = "from-bank", value_parser = parse_bank)]
        from_bank: String,
        #[arg(long = "to-cpf", value_parser = parse_cpf)]
        to_cpf: Cpf,
        #[arg(long = "to-bank", value_parser = parse_bank)]
        to_bank: String,
        #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
        amount: Decimal,
    },

    /// Show a person's accounts
    Person {
        #[arg(long, value_parser = parse_cpf)]
        cpf: Cpf,
    },

    /// Show a stored transaction
    Transaction {
        #[arg(long, value_parser = parse_transaction_id)]
        id: TransactionId,
    },

    /// Show registered people and banks
    Status,

    /// Write every account as CSV
    ExportAccounts {
        /// Output file; stdout when omitted
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Command {
    /// Whether a successful run of this command changes the ledger
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Person { .. }
                | Command::Transaction { .. }
                | Command::Status
                | Command::ExportAccounts { .. }
        )
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, LedgerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LedgerError::empty_field(field));
    }
    Ok(value)
}

pub fn parse_name(value: &str) -> Result<String, LedgerError> {
    required("name", value).map(str::to_string)
}

pub fn parse_bank(value: &str) -> Result<String, LedgerError> {
    required("bank", value).map(str::to_string)
}

pub fn parse_cpf(value: &str) -> Result<Cpf, LedgerError> {
    Cpf::from_str(value)
}

pub fn parse_amount(value: &str) -> Result<Decimal, LedgerError> {
    let value = required("amount", value)?;
    Decimal::from_str(value).map_err(|_| LedgerError::invalid_number("amount", value))
}

/// Parse a fee given in percent into a fraction (`1.5` becomes `0.015`)
pub fn parse_percent(value: &str) -> Result<Decimal, LedgerError> {
    let value = required("fee", value)?;
    let percent =
        Decimal::from_str(value).map_err(|_| LedgerError::invalid_number("fee", value))?;
    Ok(percent / Decimal::ONE_HUNDRED)
}

/// Parse a transaction id, with or without the leading `#` and zero padding
pub fn parse_transaction_id(value: &str) -> Result<TransactionId, LedgerError> {
    let value = required("id", value)?;
    value
        .trim_start_matches('#')
        .parse()
        .map_err(|_| LedgerError::invalid_number("id", value))
}
