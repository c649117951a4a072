// CLI module
// Command-line arguments, one subcommand per ledger operation

mod args;

pub use args::{
    parse_amount, parse_bank, parse_cpf, parse_name, parse_percent, parse_transaction_id, CliArgs,
    Command,
};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
