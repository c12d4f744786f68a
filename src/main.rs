//! Geoingest CLI: import an IP geolocation dump into SQLite, check it, or look up an IP.
//!
//! Exit status: 0 on success, 2 when `lookup` finds no record, 1 for any other failure.

use clap::Parser;
use geoingest::engine::arg_parser::Cli;
use geoingest::engine::{exit_status, handle_run};
use log::{debug, error};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = match handle_run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_status(&e))
        }
    };
    debug!("Total time: {:?}", start_time.elapsed());
    code
}
