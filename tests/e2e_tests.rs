//! End-to-end integration tests
//!
//! These tests drive the ledger through its public API and the CLI dispatcher:
//! 1. Build a system of banks, people and accounts
//! 2. Run deposits, withdrawals and transfers
//! 3. Check balances, vaults and stored transactions
//! 4. Save, reload and compare snapshots
//!
//! CLI sessions write their snapshots into temporary directories.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use clap::Parser;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::fs;
    use std::path::Path;
    use std::str::FromStr;
    use sub_ledger::app;
    use sub_ledger::cli::CliArgs;
    use sub_ledger::core::{FixedClock, RandomIds, SequenceIds};
    use sub_ledger::io::snapshot;
    use sub_ledger::{Cpf, ErrorKind, Ledger, LedgerError, Snapshot};
    use tempfile::TempDir;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cpf(value: u64) -> Cpf {
        Cpf::new(value).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// Alpha (1% fee) and Beta (0%), A (cpf 111) and B (cpf 222), both at Alpha
    fn scenario_ledger(now: NaiveDateTime) -> Ledger {
        let mut ledger =
            Ledger::with_sources(Box::new(FixedClock(now)), Box::new(RandomIds::seeded(2024)));
        ledger.add_bank("Alpha", d("0.01")).unwrap();
        ledger.add_bank("Beta", d("0")).unwrap();
        ledger.add_person("A", cpf(111)).unwrap();
        ledger.add_person("B", cpf(222)).unwrap();
        ledger.open_account(cpf(111), "Alpha", Decimal::ZERO).unwrap();
        ledger.open_account(cpf(222), "Alpha", Decimal::ZERO).unwrap();
        ledger
    }

    fn balance(ledger: &Ledger, who: u64, bank: &str) -> Decimal {
        ledger.get_account(cpf(who), bank).unwrap().balance
    }

    #[test]
    fn test_example_scenario() {
        let mut ledger = scenario_ledger(at(12, 0));

        let deposit = ledger.new_deposit(cpf(111), "Alpha", d("1000")).unwrap();
        ledger.execute(deposit).unwrap();
        assert_eq!(balance(&ledger, 111, "Alpha"), d("1000"));

        let transfer = ledger
            .new_transfer(cpf(111), "Alpha", cpf(222), "Alpha", d("100"))
            .unwrap();
        let id = ledger.execute(transfer).unwrap();
        assert_eq!(balance(&ledger, 111, "Alpha"), d("900"));
        assert_eq!(balance(&ledger, 222, "Alpha"), d("100"));
        assert!(ledger.get_transaction(id).unwrap().succeeded);

        let result = ledger.new_transfer(cpf(111), "Alpha", cpf(222), "Beta", d("1000"));
        let error = result.unwrap_err();
        assert_eq!(error, LedgerError::account_non_existent(cpf(222), "Beta"));
        assert_eq!(error.kind(), ErrorKind::Existence);
        assert_eq!(balance(&ledger, 111, "Alpha"), d("900"));
        assert_eq!(balance(&ledger, 222, "Alpha"), d("100"));
        assert_eq!(ledger.transactions().count(), 2);
    }

    #[rstest]
    #[case::small("10")]
    #[case::fractional("0.35")]
    #[case::large("123456.78")]
    fn test_deposit_moves_balance_and_score(#[case] amount: &str) {
        let mut ledger = scenario_ledger(at(12, 0));
        let before = ledger.get_account(cpf(111), "Alpha").unwrap().clone();

        let tx = ledger.new_deposit(cpf(111), "Alpha", d(amount)).unwrap();
        ledger.execute(tx).unwrap();

        let after = ledger.get_account(cpf(111), "Alpha").unwrap();
        assert_eq!(after.balance, before.balance + d(amount));
        assert_eq!(after.score, before.score + d("0.1") * d(amount));
    }

    #[rstest]
    #[case::within_balance("499.99", true)]
    #[case::whole_balance("500", true)]
    #[case::over_balance("500.01", false)]
    fn test_unlimited_withdrawal(#[case] amount: &str, #[case] succeeds: bool) {
        let mut ledger = scenario_ledger(at(23, 30));
        ledger.open_account(cpf(111), "Beta", d("500")).unwrap();

        let tx = ledger.new_withdrawal(cpf(111), "Beta", d(amount)).unwrap();
        let result = ledger.execute(tx);

        assert_eq!(result.is_ok(), succeeds);
        let expected = if succeeds { d("500") - d(amount) } else { d("500") };
        assert_eq!(balance(&ledger, 111, "Beta"), expected);
    }

    #[rstest]
    #[case::night_start(at(21, 0), false)]
    #[case::late_night(at(2, 30), false)]
    #[case::night_end(at(4, 0), true)]
    #[case::afternoon(at(15, 0), true)]
    fn test_limited_withdrawal_above_night_cap(
        #[case] now: NaiveDateTime,
        #[case] succeeds: bool,
    ) {
        let mut ledger = scenario_ledger(now);
        ledger.open_account(cpf(111), "Beta", d("90000")).unwrap();
        ledger.set_account_limit(cpf(111), "Beta", true).unwrap();

        let tx = ledger.new_withdrawal(cpf(111), "Beta", d("60000")).unwrap();
        let result = ledger.execute(tx);

        assert_eq!(result.is_ok(), succeeds);
        if !succeeds {
            assert!(matches!(result, Err(LedgerError::NightLimitExceeded { .. })));
            assert_eq!(balance(&ledger, 111, "Beta"), d("90000"));
        }
    }

    #[rstest]
    #[case::night(at(22, 0))]
    #[case::day(at(10, 0))]
    fn test_limited_withdrawal_within_night_cap_any_hour(#[case] now: NaiveDateTime) {
        let mut ledger = scenario_ledger(now);
        ledger.open_account(cpf(111), "Beta", d("90000")).unwrap();
        ledger.set_account_limit(cpf(111), "Beta", true).unwrap();

        let tx = ledger.new_withdrawal(cpf(111), "Beta", d("50000")).unwrap();

        assert!(ledger.execute(tx).is_ok());
        assert_eq!(balance(&ledger, 111, "Beta"), d("40000"));
    }

    #[test]
    fn test_inter_bank_transfer_amounts() {
        let mut ledger = scenario_ledger(at(12, 0));
        ledger.open_account(cpf(222), "Beta", Decimal::ZERO).unwrap();
        let deposit = ledger.new_deposit(cpf(111), "Alpha", d("1000")).unwrap();
        ledger.execute(deposit).unwrap();

        let transfer = ledger
            .new_transfer(cpf(111), "Alpha", cpf(222), "Beta", d("200"))
            .unwrap();
        ledger.execute(transfer).unwrap();

        assert_eq!(balance(&ledger, 111, "Alpha"), d("1000") - d("200") * d("1.01"));
        assert_eq!(balance(&ledger, 222, "Beta"), d("200"));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ledger = Ledger::with_sources(
            Box::new(FixedClock(at(9, 0))),
            Box::new(SequenceIds::new([1, 1, 2, 2, 1, 3])),
        );
        ledger.add_bank("Alpha", Decimal::ZERO).unwrap();
        ledger.add_person("A", cpf(111)).unwrap();
        ledger.open_account(cpf(111), "Alpha", Decimal::ZERO).unwrap();

        let mut ids = Vec::new();
        for _ in 0..3 {
            let tx = ledger.new_deposit(cpf(111), "Alpha", d("1")).unwrap();
            ids.push(ledger.execute(tx).unwrap());
        }

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_bank_removal_depends_on_clients() {
        let mut ledger = scenario_ledger(at(12, 0));

        assert_eq!(
            ledger.remove_bank("Alpha").unwrap_err(),
            LedgerError::bank_not_empty("Alpha", 2)
        );
        assert!(ledger.bank_exists("Alpha"));
        assert!(ledger.remove_bank("Beta").is_ok());

        ledger.remove_person(cpf(111)).unwrap();
        ledger.close_account(cpf(222), "Alpha").unwrap();
        assert!(ledger.remove_bank("Alpha").is_ok());
    }

    #[test]
    fn test_snapshot_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("round.syss");
        let mut ledger = scenario_ledger(at(12, 0));
        let deposit = ledger.new_deposit(cpf(111), "Alpha", d("1000")).unwrap();
        ledger.execute(deposit).unwrap();
        let transfer = ledger
            .new_transfer(cpf(111), "Alpha", cpf(222), "Alpha", d("100"))
            .unwrap();
        ledger.execute(transfer).unwrap();

        snapshot::write(&path, &ledger).unwrap();
        let restored = snapshot::load(&path).unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(Snapshot::from_ledger(&restored), Snapshot::from_ledger(&ledger));
    }

    fn cli(args: &[&str]) -> CliArgs {
        let mut argv = vec!["sub"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap()
    }

    fn run_cli(snapshot: &Path, args: &[&str]) -> Result<String, LedgerError> {
        let mut full = vec!["--snapshot", snapshot.to_str().unwrap()];
        full.extend_from_slice(args);
        let mut out = Vec::new();
        app::run(&cli(&full), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_session_persists_between_commands() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.syss");

        run_cli(&path, &["add-bank", "--name", "Alpha", "--fee", "1"]).unwrap();
        run_cli(&path, &["add-bank", "--name", "Beta"]).unwrap();
        run_cli(&path, &["add-person", "--name", "ana", "--cpf", "111"]).unwrap();
        run_cli(&path, &["add-person", "--name", "bia", "--cpf", "222"]).unwrap();
        run_cli(&path, &["open-account", "--cpf", "111", "--bank", "Alpha"]).unwrap();
        run_cli(&path, &["open-account", "--cpf", "222", "--bank", "Beta"]).unwrap();
        run_cli(
            &path,
            &["deposit", "--cpf", "111", "--bank", "Alpha", "--amount", "1000"],
        )
        .unwrap();

        let transfer = run_cli(
            &path,
            &[
                "transfer", "--from-cpf", "111", "--from-bank", "Alpha", "--to-cpf", "222",
                "--to-bank", "Beta", "--amount", "100",
            ],
        )
        .unwrap();
        assert!(transfer.contains("(debited R$ 101.00)"));

        let ledger = snapshot::load(&path).unwrap();
        assert_eq!(ledger.get_account(cpf(111), "Alpha").unwrap().balance, d("899"));
        assert_eq!(ledger.get_account(cpf(222), "Beta").unwrap().balance, d("100"));
        assert_eq!(ledger.transactions().count(), 2);

        let report = run_cli(&path, &["person", "--cpf", "111"]).unwrap();
        assert!(report.contains("Balance at Alpha: R$ 899.00"));
    }

    #[test]
    fn test_cli_failure_leaves_snapshot_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.syss");
        run_cli(&path, &["add-bank", "--name", "Alpha"]).unwrap();
        run_cli(&path, &["add-person", "--name", "ana", "--cpf", "111"]).unwrap();
        run_cli(&path, &["open-account", "--cpf", "111", "--bank", "Alpha"]).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let result = run_cli(
            &path,
            &["withdraw", "--cpf", "111", "--bank", "Alpha", "--amount", "5"],
        );

        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_cli_new_session_saves_into_saves_dir() {
        let dir = TempDir::new().unwrap();
        let saves = dir.path().join("saves");
        let args = cli(&[
            "--saves-dir",
            saves.to_str().unwrap(),
            "add-bank",
            "--name",
            "Alpha",
        ]);

        let mut out = Vec::new();
        let written = app::run(&args, &mut out).unwrap().unwrap();

        assert_eq!(written.parent(), Some(saves.as_path()));
        let name = written.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("SAVE_") && name.ends_with(".syss"));
        assert!(snapshot::load(&written).unwrap().bank_exists("Alpha"));
    }

    #[test]
    fn test_cli_snapshot_in_missing_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive").join("2024").join("session.syss");

        let text = run_cli(&path, &["add-bank", "--name", "Alpha"]).unwrap();

        assert!(text.contains("Saved to"));
        assert!(snapshot::load(&path).unwrap().bank_exists("Alpha"));
    }

    #[test]
    fn test_cli_read_only_commands_do_not_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.syss");

        let status = run_cli(&path, &["status"]).unwrap();

        assert!(status.contains("There are no people registered."));
        assert!(!path.exists());
    }

    #[test]
    fn test_cli_export_accounts_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.syss");
        let csv_path = dir.path().join("accounts.csv");
        run_cli(&path, &["add-bank", "--name", "Alpha"]).unwrap();
        run_cli(&path, &["add-person", "--name", "ana", "--cpf", "111"]).unwrap();
        run_cli(
            &path,
            &["open-account", "--cpf", "111", "--bank", "Alpha", "--initial", "42"],
        )
        .unwrap();

        let text = run_cli(
            &path,
            &["export-accounts", "--output", csv_path.to_str().unwrap()],
        )
        .unwrap();

        assert!(text.starts_with("Exported 1 account(s)"));
        assert_eq!(
            fs::read_to_string(&csv_path).unwrap(),
            "bank,cpf,name,balance,score,limited\nAlpha,000.000.001-11,Ana,42.00,100.00,false\n"
        );
    }

    #[test]
    fn test_cli_rejects_non_snapshot_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let result = run_cli(&path, &["status"]);

        assert!(matches!(result, Err(LedgerError::InvalidSnapshotPath { .. })));
    }
}
