//! SUB command-line front end
//!
//! Runs one ledger operation per invocation against a snapshot file.
//!
//! # Usage
//!
//! ```bash
//! sub add-bank --name Alpha --fee 1
//! sub --snapshot saves/SAVE_05-01-2024_09-07.syss add-person --name Ana --cpf 123.456.789-01
//! sub --snapshot saves/SAVE_05-01-2024_09-07.syss deposit --cpf 12345678901 --bank Alpha --amount 100
//! sub --snapshot saves/SAVE_05-01-2024_09-07.syss status
//! ```
//!
//! Without `--snapshot` a new ledger is created and saved under `--saves-dir`. The
//! path of the written snapshot is printed after every command that changes state.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: The operation was rejected or the snapshot could not be read or written;
//!   nothing is saved

use std::io;
use std::process;
use sub_ledger::{app, cli};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn main() {
    let args = cli::parse_args();
    init_logging(&args.log_level);

    let result = app::run(&args, &mut io::stdout().lock());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
