//! I/O module
//!
//! Handles everything that leaves or enters the process besides CLI arguments.
//!
//! # Components
//!
//! - `snapshot` - Whole-ledger save files (`.syss`, JSON records)
//! - `report` - Text views of system status, people and transactions
//! - `csv_format` - CSV export of account states

pub mod csv_format;
pub mod report;
pub mod snapshot;

pub use csv_format::write_accounts_csv;
pub use report::{PersonReport, StatusReport, TransactionReport};
pub use snapshot::{save_file_name, Snapshot, SnapshotStore};
