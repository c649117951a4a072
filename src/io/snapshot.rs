//! Snapshot persistence
//!
//! The whole ledger is written to a single `.syss` file as pretty-printed JSON.
//! Records carry keys (cpf, bank name, transaction id) in place of references, and
//! loading rebuilds the ledger through [`Ledger::restore`], which checks every
//! cross-reference.
//!
//! Save files are named after the moment of the first save in a session:
//! `SAVE_dd-mm-YYYY_HH-MM.syss`.

use crate::core::Ledger;
use crate::types::{
    Account, Bank, Cpf, LedgerError, Person, Transaction, TransactionId, TransactionKind,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension every snapshot file must carry
pub const SNAPSHOT_EXTENSION: &str = "syss";

/// Full ledger state as plain records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub people: Vec<PersonRecord>,
    pub banks: Vec<BankRecord>,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub cpf: Cpf,
    pub accounts: Vec<AccountRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub bank: String,
    pub balance: Decimal,
    pub score: Decimal,
    pub max_day_draw: Decimal,
    pub max_night_draw: Decimal,
    pub is_limited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    pub name: String,
    pub fee: Decimal,
    pub vault: Decimal,
    pub clients: Vec<Cpf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub value: Decimal,
    pub date: Option<NaiveDateTime>,
    pub succeeded: bool,
    pub kind: TransactionKind,
}

impl Snapshot {
    /// Capture the current state of `ledger`
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let people = ledger
            .people()
            .map(|person| PersonRecord {
                name: person.name.clone(),
                cpf: person.cpf,
                accounts: person
                    .accounts()
                    .map(|(bank, account)| AccountRecord {
                        bank: bank.to_string(),
                        balance: account.balance,
                        score: account.score,
                        max_day_draw: account.max_day_draw,
                        max_night_draw: account.max_night_draw,
                        is_limited: account.is_limited,
                    })
                    .collect(),
            })
            .collect();

        let banks = ledger
            .banks()
            .map(|bank| BankRecord {
                name: bank.name.clone(),
                fee: bank.fee,
                vault: bank.vault,
                clients: bank.clients().collect(),
            })
            .collect();

        // Only stored transactions reach here, and those always carry an id
        let transactions = ledger
            .transactions()
            .filter_map(|tx| {
                tx.id.map(|id| TransactionRecord {
                    id,
                    value: tx.value,
                    date: tx.date,
                    succeeded: tx.succeeded,
                    kind: tx.kind.clone(),
                })
            })
            .collect();

        Snapshot {
            people,
            banks,
            transactions,
        }
    }

    /// Rebuild a ledger from the records
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` if a person lists two accounts at one bank, or if the
    /// records break any ledger invariant.
    pub fn into_ledger(self) -> Result<Ledger, LedgerError> {
        let mut people = Vec::with_capacity(self.people.len());
        for record in self.people {
            let mut person = Person::new(&record.name, record.cpf);
            for account in record.accounts {
                let restored = Account {
                    balance: account.balance,
                    score: account.score,
                    max_day_draw: account.max_day_draw,
                    max_night_draw: account.max_night_draw,
                    is_limited: account.is_limited,
                };
                person
                    .restore_account(&account.bank, restored)
                    .map_err(|e| LedgerError::corrupt_snapshot(e.to_string()))?;
            }
            people.push(person);
        }

        let banks = self
            .banks
            .into_iter()
            .map(|record| {
                Bank::from_parts(
                    record.name,
                    record.fee,
                    record.vault,
                    record.clients.into_iter().collect(),
                )
            })
            .collect();

        let transactions = self
            .transactions
            .into_iter()
            .map(|record| Transaction {
                id: Some(record.id),
                value: record.value,
                date: record.date,
                succeeded: record.succeeded,
                kind: record.kind,
            })
            .collect();

        Ledger::restore(people, banks, transactions)
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Save file name for a session whose first save happens at `at`
pub fn save_file_name(at: NaiveDateTime) -> String {
    format!(
        "SAVE_{}.{}",
        at.format("%d-%m-%Y_%H-%M"),
        SNAPSHOT_EXTENSION
    )
}

fn has_snapshot_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == SNAPSHOT_EXTENSION)
}

/// Read and rebuild the ledger stored at `path`
///
/// # Errors
///
/// - `InvalidSnapshotPath` if `path` does not end in `.syss`
/// - `Io` if the file cannot be read
/// - `Serialization` if it is not a valid snapshot document
/// - `CorruptSnapshot` if the records break a ledger invariant
pub fn load(path: &Path) -> Result<Ledger, LedgerError> {
    if !has_snapshot_extension(path) {
        return Err(LedgerError::invalid_snapshot_path(&path.display().to_string()));
    }

    let json = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = json.len(), "snapshot read");
    let ledger = Snapshot::from_json(&json)?.into_ledger()?;
    info!(path = %path.display(), "snapshot loaded");
    Ok(ledger)
}

/// Write the whole ledger to `path`, replacing any previous content
pub fn write(path: &Path, ledger: &Ledger) -> Result<(), LedgerError> {
    let json = Snapshot::from_ledger(ledger).to_json()?;
    fs::write(path, &json)?;
    debug!(path = %path.display(), bytes = json.len(), "snapshot written");
    Ok(())
}

/// Where a session's snapshots go
///
/// A store either starts from an existing file, which it keeps overwriting, or from
/// a directory, in which case the file name is picked on the first save and reused
/// for the rest of the session.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Store that names its file on the first save, inside `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore {
            dir: dir.into(),
            path: None,
        }
    }

    /// Store bound to an existing snapshot file
    ///
    /// # Errors
    ///
    /// `InvalidSnapshotPath` if `path` does not end in `.syss`.
    pub fn at_file(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if !has_snapshot_extension(&path) {
            return Err(LedgerError::invalid_snapshot_path(&path.display().to_string()));
        }
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(SnapshotStore {
            dir,
            path: Some(path),
        })
    }

    /// File the next save goes to, if already decided
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the ledger from the bound file
    pub fn load(&self) -> Result<Ledger, LedgerError> {
        match &self.path {
            Some(path) => load(path),
            None => Err(LedgerError::invalid_snapshot_path(
                &self.dir.display().to_string(),
            )),
        }
    }

    /// Save the whole ledger and return the file written
    ///
    /// Creates the target directory when it is missing.
    pub fn save(&mut self, ledger: &Ledger) -> Result<PathBuf, LedgerError> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let path = self.dir.join(save_file_name(ledger.now()));
                self.path = Some(path.clone());
                path
            }
        };

        write(&path, ledger)?;
        info!(path = %path.display(), "snapshot saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, SequenceIds};
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cpf(value: u64) -> Cpf {
        Cpf::new(value).unwrap()
    }

    fn moment() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 7, 30)
            .unwrap()
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::with_sources(
            Box::new(FixedClock(moment())),
            Box::new(SequenceIds::new([42, 7])),
        );
        ledger.add_bank("Alpha", d("0.01")).unwrap();
        ledger.add_bank("Beta", d("0.02")).unwrap();
        ledger.add_person("ana", cpf(111)).unwrap();
        ledger.add_person("bruno", cpf(222)).unwrap();
        ledger.open_account(cpf(111), "Alpha", Decimal::ZERO).unwrap();
        ledger.open_account(cpf(222), "Beta", Decimal::ZERO).unwrap();
        ledger.set_account_limit(cpf(222), "Beta", true).unwrap();

        let deposit = ledger.new_deposit(cpf(111), "Alpha", d("1000")).unwrap();
        ledger.execute(deposit).unwrap();
        let transfer = ledger
            .new_transfer(cpf(111), "Alpha", cpf(222), "Beta", d("250.50"))
            .unwrap();
        ledger.execute(transfer).unwrap();
        ledger
    }

    #[test]
    fn test_save_file_name_format() {
        assert_eq!(save_file_name(moment()), "SAVE_05-01-2024_09-07.syss");
    }

    #[test]
    fn test_json_round_trip_preserves_ledger() {
        let ledger = sample_ledger();

        let json = Snapshot::from_ledger(&ledger).to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap().into_ledger().unwrap();

        assert_eq!(restored, ledger);
        let tx = restored.get_transaction(7).unwrap();
        assert_eq!(tx.value, d("250.50"));
        assert_eq!(tx.date, Some(moment()));
        assert!(tx.succeeded);
        assert!(restored.get_account(cpf(222), "Beta").unwrap().is_limited);
    }

    #[test]
    fn test_decimals_stored_as_strings() {
        let json = Snapshot::from_ledger(&sample_ledger()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["banks"][0]["fee"], "0.01");
        assert_eq!(value["transactions"][0]["kind"]["type"], "transfer");
    }

    #[test]
    fn test_store_names_file_once_and_reuses_it() {
        let dir = TempDir::new().unwrap();
        let saves = dir.path().join("saves");
        let mut store = SnapshotStore::in_dir(&saves);
        let ledger = sample_ledger();

        let first = store.save(&ledger).unwrap();
        let second = store.save(&ledger).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, saves.join("SAVE_05-01-2024_09-07.syss"));
        assert_eq!(load(&first).unwrap(), ledger);
    }

    #[test]
    fn test_store_at_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.syss");
        write(&path, &sample_ledger()).unwrap();

        let mut store = SnapshotStore::at_file(&path).unwrap();
        let mut ledger = store.load().unwrap();
        ledger.remove_person(cpf(222)).unwrap();
        assert_eq!(store.save(&ledger).unwrap(), path);

        let reloaded = load(&path).unwrap();
        assert!(!reloaded.person_exists(cpf(222)));
        assert_eq!(reloaded.transactions().count(), 2);
    }

    #[test]
    fn test_store_at_file_creates_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("bank.syss");

        let mut store = SnapshotStore::at_file(&path).unwrap();
        assert_eq!(store.save(&sample_ledger()).unwrap(), path);

        let reloaded = load(&path).unwrap();
        assert!(reloaded.person_exists(cpf(222)));
    }

    #[rstest]
    #[case::wrong_extension("save.json")]
    #[case::no_extension("save")]
    #[case::suffix_only_in_name("save.syss.bak")]
    fn test_load_rejects_non_snapshot_paths(#[case] name: &str) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, "{}").unwrap();

        assert!(matches!(
            load(&path),
            Err(LedgerError::InvalidSnapshotPath { .. })
        ));
        assert!(SnapshotStore::at_file(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load(&dir.path().join("missing.syss"));
        assert!(matches!(result, Err(LedgerError::Io { .. })));
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.syss");
        fs::write(&path, "not json at all").unwrap();

        assert!(matches!(load(&path), Err(LedgerError::Serialization { .. })));
    }

    #[test]
    fn test_dangling_client_is_corrupt() {
        let mut snapshot = Snapshot::from_ledger(&sample_ledger());
        snapshot.banks[0].clients.push(cpf(999));

        assert!(matches!(
            snapshot.into_ledger(),
            Err(LedgerError::CorruptSnapshot { .. })
        ));
    }

    #[test]
    fn test_duplicate_account_is_corrupt() {
        let mut snapshot = Snapshot::from_ledger(&sample_ledger());
        let duplicate = snapshot.people[0].accounts[0].clone();
        snapshot.people[0].accounts.push(duplicate);

        assert!(matches!(
            snapshot.into_ledger(),
            Err(LedgerError::CorruptSnapshot { .. })
        ));
    }
}
