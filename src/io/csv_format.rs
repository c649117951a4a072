//! CSV export of account states
//!
//! Writes one row per account with columns: bank, cpf, name, balance, score,
//! limited. Rows are ordered by bank name, then cpf, for deterministic output.

use crate::core::Ledger;
use crate::types::{Cpf, LedgerError};
use std::io::Write;

/// Write every account in `ledger` to `output` as CSV
///
/// Money and scores are written with two fraction digits.
///
/// # Returns
///
/// * `Ok(usize)` - Number of account rows written
/// * `Err(LedgerError)` - If writing to `output` failed
pub fn write_accounts_csv(ledger: &Ledger, output: &mut dyn Write) -> Result<usize, LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["bank", "cpf", "name", "balance", "score", "limited"])?;

    let mut rows: Vec<(&str, Cpf, &str, _)> = ledger
        .people()
        .flat_map(|person| {
            person
                .accounts()
                .map(move |(bank, account)| (bank, person.cpf, person.name.as_str(), account))
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

    for (bank, cpf, name, account) in &rows {
        writer.write_record(&[
            bank.to_string(),
            cpf.to_string(),
            name.to_string(),
            format!("{:.2}", account.balance),
            format!("{:.2}", account.score),
            account.is_limited.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(rows.len())
}
