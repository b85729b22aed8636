//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `guildhall_core` linkage with deterministic output.
//! - Optionally open (and migrate) a database file given as first argument.

use guildhall_core::db::{migrations::latest_version, open_db};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("guildhall_core ping={}", guildhall_core::ping());
    println!("guildhall_core version={}", guildhall_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match open_db(&db_path) {
        Ok(_) => {
            println!("db path={db_path} schema_version={}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("db path={db_path} error={err}");
            ExitCode::FAILURE
        }
    }
}
