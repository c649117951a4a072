//! Command dispatch
//!
//! Maps each parsed [`Command`] to one ledger operation and writes the outcome as
//! text. A session loads the ledger from its snapshot (or starts empty), runs one
//! command, and saves the snapshot only if the command changed the ledger.

use crate::cli::{CliArgs, Command};
use crate::core::Ledger;
use crate::io::report::{Figure, PersonReport, StatusReport, TransactionReport};
use crate::io::{write_accounts_csv, SnapshotStore};
use crate::types::LedgerError;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Load the ledger named by `args`, with the store it should be saved to
///
/// With `--snapshot`, an existing file is loaded and a missing one starts an empty
/// ledger that will be written there. Without it, a new ledger is saved into the
/// saves directory.
pub fn open_session(args: &CliArgs) -> Result<(Ledger, SnapshotStore), LedgerError> {
    match &args.snapshot {
        Some(path) => {
            let store = SnapshotStore::at_file(path)?;
            let ledger = if path.exists() {
                store.load()?
            } else {
                info!(path = %path.display(), "snapshot not found, starting empty");
                Ledger::new()
            };
            Ok((ledger, store))
        }
        None => Ok((Ledger::new(), SnapshotStore::in_dir(&args.saves_dir))),
    }
}

/// Run one full session and return the snapshot written, if any
///
/// `out` is flushed before returning, so a failed write surfaces as an error.
pub fn run(args: &CliArgs, out: &mut dyn Write) -> Result<Option<PathBuf>, LedgerError> {
    let (mut ledger, mut store) = open_session(args)?;

    execute_command(&mut ledger, &args.command, out)?;

    let saved = if args.command.mutates() {
        let path = store.save(&ledger)?;
        writeln!(out, "Saved to {}", path.display())?;
        Some(path)
    } else {
        debug!("read-only command, snapshot left as is");
        None
    };
    out.flush()?;
    Ok(saved)
}

/// Apply `command` to `ledger` and write a human-readable outcome to `out`
pub fn execute_command(
    ledger: &mut Ledger,
    command: &Command,
    out: &mut dyn Write,
) -> Result<(), LedgerError> {
    match command {
        Command::AddPerson { name, cpf } => {
            let person = ledger.add_person(name, *cpf)?;
            writeln!(out, "Person '{}' registered with CPF {}.", person.name, person.cpf)?;
        }
        Command::RemovePerson { cpf } => {
            let person = ledger.remove_person(*cpf)?;
            writeln!(out, "Person '{}' removed from the system.", person.name)?;
        }
        Command::AddBank { name, fee } => {
            let bank = ledger.add_bank(name, *fee)?;
            writeln!(
                out,
                "Bank '{}' created with a {} transfer fee.",
                bank.name,
                Figure::percent(bank.fee_percent())
            )?;
        }
        Command::RemoveBank { name } => {
            let bank = ledger.remove_bank(name)?;
            writeln!(out, "Bank '{}' removed from the system.", bank.name)?;
        }
        Command::OpenAccount { cpf, bank, initial } => {
            ledger.open_account(*cpf, bank, *initial)?;
            let name = &ledger.get_person(*cpf)?.name;
            writeln!(out, "Account for {} opened at {}.", name, bank)?;
        }
        Command::CloseAccount { cpf, bank } => {
            ledger.close_account(*cpf, bank)?;
            let name = &ledger.get_person(*cpf)?.name;
            writeln!(out, "Account for {} at {} closed.", name, bank)?;
        }
        Command::SetLimit { cpf, bank, limited } => {
            ledger.set_account_limit(*cpf, bank, *limited)?;
            let state = if *limited { "enabled" } else { "disabled" };
            writeln!(out, "Withdrawal limits {} for CPF {} at {}.", state, cpf, bank)?;
        }
        Command::Deposit { cpf, bank, amount } => {
            let tx = ledger.new_deposit(*cpf, bank, *amount)?;
            let value = tx.value;
            let id = ledger.execute(tx)?;
            let balance = ledger.get_account(*cpf, bank)?.balance;
            writeln!(
                out,
                "Deposit #{id:09}: R$ {value:.2} into {bank}. New balance: R$ {balance:.2}"
            )?;
        }
        Command::Withdraw { cpf, bank, amount } => {
            let tx = ledger.new_withdrawal(*cpf, bank, *amount)?;
            let value = tx.value;
            let id = ledger.execute(tx)?;
            let balance = ledger.get_account(*cpf, bank)?.balance;
            writeln!(
                out,
                "Withdrawal #{id:09}: R$ {value:.2} from {bank}. New balance: R$ {balance:.2}"
            )?;
        }
        Command::Transfer {
            from_cpf,
            from_bank,
            to_cpf,
            to_bank,
            amount,
        } => {
            let tx = ledger.new_transfer(*from_cpf, from_bank, *to_cpf, to_bank, *amount)?;
            let debited = ledger.taxed_value(&tx)?;
            let id = ledger.execute(tx)?;
            let from = &ledger.get_person(*from_cpf)?.name;
            let to = &ledger.get_person(*to_cpf)?.name;
            writeln!(
                out,
                "Transfer #{id:09}: R$ {amount:.2} from {from} at {from_bank} to {to} at {to_bank} \
                 (debited R$ {debited:.2})"
            )?;
        }
        Command::Person { cpf } => {
            write!(out, "{}", PersonReport::new(ledger, *cpf)?)?;
        }
        Command::Transaction { id } => {
            write!(out, "{}", TransactionReport::new(ledger, *id)?)?;
        }
        Command::Status => {
            write!(out, "{}", StatusReport::new(ledger))?;
        }
        Command::ExportAccounts { output } => match output {
            Some(path) => {
                let mut file = File::create(path)?;
                let rows = write_accounts_csv(ledger, &mut file)?;
                writeln!(out, "Exported {} account(s) to {}", rows, path.display())?;
            }
            None => {
                write_accounts_csv(ledger, out)?;
            }
        },
    }
    Ok(())
}
