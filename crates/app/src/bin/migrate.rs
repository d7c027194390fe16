//! `openbooks-migrate` - apply SQL migrations to the local database.
//!
//! Usage: `openbooks-migrate <migrations-dir> [db-path]`
//!
//! Reads ordered `.sql` files from the directory, splits them on the
//! statement breakpoint marker, and applies them sequentially. Exits
//! non-zero only on an unhandled top-level error; individual statement
//! failures are logged and counted.

use std::process::ExitCode;

use openbooks_app::utils::logging::init_tracing;
use openbooks_domain::Result;
use openbooks_infra::config;
use openbooks_infra::migrations::MigrationRunner;
use tracing::{error, info};

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "migration run failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let migrations_dir = args.next().unwrap_or_else(|| "migrations".to_string());
    let db_path = match args.next() {
        Some(path) => path,
        None => config::load().unwrap_or_default().database.path,
    };

    info!(migrations_dir = %migrations_dir, db_path = %db_path, "applying migrations");

    let report = MigrationRunner::new(&migrations_dir).run(&db_path)?;

    info!(
        applied = report.applied.len(),
        already_applied = report.already_applied.len(),
        skipped_statements = report.skipped_statements,
        failed_statements = report.failed_statements,
        "migration run finished"
    );

    Ok(())
}
