//! Bulk Send Simulator CLI
//!
//! # Usage
//!
//! ```bash
//! cargo run -- run customers.csv --attachments uploads/ > results.csv
//! cargo run -- run --sample --attach INV-001.pdf --pacing instant
//! cargo run -- run customers.csv --attachments uploads/ --seed 7 --progress json -o results.csv
//! cargo run -- template --mode document > template.csv
//! ```
//!
//! Progress and logs go to stderr; the results report (or template) goes to
//! stdout unless `--output` is given.
//!
//! # Exit Codes
//!
//! - 0: Success (including runs where records failed)
//! - 1: Error (input not found, malformed input, unwritable output, etc.)

use bulk_send_simulator::cli;
use bulk_send_simulator::logging::LoggingConfig;
use bulk_send_simulator::runner;
use std::io::IsTerminal;
use std::process;

fn main() {
    let args = cli::parse_args();

    let mut logging = LoggingConfig::new().with_level(args.log_level);
    if args.json_logs {
        logging = logging.with_json_format();
    }
    if !std::io::stderr().is_terminal() {
        logging = logging.without_ansi();
    }
    if let Err(e) = logging.init() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let mut output = std::io::stdout();
    if let Err(e) = runner::execute(&args.command, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
