//! Sequential SQL migration runner.
//!
//! Reads `.sql` files from a directory in lexicographic order, splits each
//! file into statements on the breakpoint marker, and executes them one by
//! one. "Already exists" errors are skipped as idempotent reruns; other
//! statement errors are logged and counted but do not stop the run. Applied
//! migration names are recorded in a tracking table guarded by an existence
//! check.

use std::path::{Path, PathBuf};

use openbooks_domain::constants::{MIGRATIONS_TRACKING_TABLE, STATEMENT_BREAKPOINT};
use openbooks_domain::{BooksError, Result};
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migration files whose statements all executed (or were skipped)
    pub applied: Vec<String>,
    /// Migration files skipped because they were already recorded
    pub already_applied: Vec<String>,
    /// Statements skipped as idempotent "already exists" reruns
    pub skipped_statements: usize,
    /// Statements that failed for any other reason
    pub failed_statements: usize,
}

/// Applies ordered SQL migration files to a SQLite database.
pub struct MigrationRunner {
    migrations_dir: PathBuf,
}

impl MigrationRunner {
    pub fn new<P: AsRef<Path>>(migrations_dir: P) -> Self {
        Self { migrations_dir: migrations_dir.as_ref().to_path_buf() }
    }

    /// Run all pending migrations against the database at `db_path`.
    ///
    /// The connection is always closed before returning, whether or not the
    /// run succeeded.
    pub fn run<P: AsRef<Path>>(&self, db_path: P) -> Result<MigrationReport> {
        let conn = Connection::open(db_path.as_ref())
            .map_err(|e| BooksError::Database(e.to_string()))?;

        let result = self.run_on_connection(&conn);

        // Guaranteed cleanup: close the handle regardless of outcome.
        if let Err((_conn, err)) = conn.close() {
            warn!(error = %err, "failed to close migration connection");
        }

        result
    }

    /// Run all pending migrations on an existing connection.
    pub fn run_on_connection(&self, conn: &Connection) -> Result<MigrationReport> {
        ensure_tracking_table(conn)?;

        let mut files = list_migration_files(&self.migrations_dir)?;
        files.sort();

        let mut report = MigrationReport::default();

        for path in files {
            let name = migration_name(&path);

            if is_applied(conn, &name)? {
                debug!(migration = %name, "migration already applied");
                report.already_applied.push(name);
                continue;
            }

            info!(migration = %name, "applying migration");
            let sql = std::fs::read_to_string(&path)
                .map_err(|e| BooksError::Database(format!("failed to read {name}: {e}")))?;

            for statement in split_statements(&sql) {
                match conn.execute_batch(statement) {
                    Ok(()) => {}
                    Err(err) if is_already_exists(&err) => {
                        debug!(migration = %name, "statement skipped (already exists)");
                        report.skipped_statements += 1;
                    }
                    Err(err) => {
                        warn!(migration = %name, error = %err, "statement failed");
                        report.failed_statements += 1;
                    }
                }
            }

            record_applied(conn, &name)?;
            report.applied.push(name);
        }

        info!(
            applied = report.applied.len(),
            already_applied = report.already_applied.len(),
            skipped = report.skipped_statements,
            failed = report.failed_statements,
            "migration run complete"
        );

        Ok(report)
    }
}

/// Split a migration file into statements on the breakpoint marker.
///
/// Blank fragments (e.g. a trailing marker) are dropped.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(STATEMENT_BREAKPOINT)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn list_migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        BooksError::Database(format!("failed to read migrations dir {}: {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BooksError::Database(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("sql") {
            files.push(path);
        }
    }
    Ok(files)
}

fn migration_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown").to_string()
}

fn ensure_tracking_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TRACKING_TABLE} (
            name TEXT PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )"
    ))
    .map_err(|e| BooksError::Database(e.to_string()))
}

fn is_applied(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {MIGRATIONS_TRACKING_TABLE} WHERE name = ?1"),
            params![name],
            |row| row.get(0),
        )
        .map_err(|e| BooksError::Database(e.to_string()))?;
    Ok(count > 0)
}

fn record_applied(conn: &Connection, name: &str) -> Result<()> {
    // INSERT OR IGNORE guards against a concurrent run racing the
    // existence check.
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {MIGRATIONS_TRACKING_TABLE} (name, applied_at)
             VALUES (?1, CAST(strftime('%s','now') AS INTEGER))"
        ),
        params![name],
    )
    .map_err(|e| BooksError::Database(e.to_string()))?;
    Ok(())
}

fn is_already_exists(err: &rusqlite::Error) -> bool {
    let message = err.to_string().to_ascii_lowercase();
    message.contains("already exists") || message.contains("duplicate")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_migration(dir: &Path, name: &str, sql: &str) {
        std::fs::write(dir.join(name), sql).expect("migration written");
    }

    #[test]
    fn splits_on_breakpoint_marker() {
        let sql = "CREATE TABLE a (id TEXT);\n--> statement-breakpoint\nCREATE TABLE b (id TEXT);\n--> statement-breakpoint\n";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(statements[1].starts_with("CREATE TABLE b"));
    }

    #[test]
    fn applies_migrations_in_lexicographic_order() {
        let dir = TempDir::new().expect("temp dir");
        write_migration(
            dir.path(),
            "0001_accounts.sql",
            "CREATE TABLE accounts (id TEXT PRIMARY KEY);",
        );
        write_migration(
            dir.path(),
            "0000_init.sql",
            "CREATE TABLE invoices (id TEXT PRIMARY KEY);",
        );

        let db = dir.path().join("books.db");
        let report = MigrationRunner::new(dir.path()).run(&db).expect("migrations ran");

        assert_eq!(report.applied, vec!["0000_init", "0001_accounts"]);
        assert_eq!(report.failed_statements, 0);

        let conn = Connection::open(&db).expect("db opened");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('invoices', 'accounts')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn rerun_skips_recorded_migrations() {
        let dir = TempDir::new().expect("temp dir");
        write_migration(dir.path(), "0000_init.sql", "CREATE TABLE t (id TEXT);");

        let db = dir.path().join("books.db");
        let runner = MigrationRunner::new(dir.path());
        runner.run(&db).expect("first run");
        let report = runner.run(&db).expect("second run");

        assert!(report.applied.is_empty());
        assert_eq!(report.already_applied, vec!["0000_init"]);
    }

    #[test]
    fn already_exists_statements_are_non_fatal() {
        let dir = TempDir::new().expect("temp dir");
        let db = dir.path().join("books.db");

        // Pre-create the table the migration will also try to create.
        let conn = Connection::open(&db).expect("db opened");
        conn.execute_batch("CREATE TABLE t (id TEXT);").expect("seeded");
        drop(conn);

        write_migration(
            dir.path(),
            "0000_init.sql",
            "CREATE TABLE t (id TEXT);\n--> statement-breakpoint\nCREATE TABLE u (id TEXT);",
        );

        let report = MigrationRunner::new(dir.path()).run(&db).expect("ran");
        assert_eq!(report.skipped_statements, 1);
        assert_eq!(report.failed_statements, 0);
        assert_eq!(report.applied, vec!["0000_init"]);
    }

    #[test]
    fn other_statement_errors_are_counted_and_execution_continues() {
        let dir = TempDir::new().expect("temp dir");
        write_migration(
            dir.path(),
            "0000_init.sql",
            "THIS IS NOT SQL;\n--> statement-breakpoint\nCREATE TABLE ok (id TEXT);",
        );

        let db = dir.path().join("books.db");
        let report = MigrationRunner::new(dir.path()).run(&db).expect("ran");

        assert_eq!(report.failed_statements, 1);
        assert_eq!(report.applied, vec!["0000_init"]);

        let conn = Connection::open(&db).expect("db opened");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'ok'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn tracking_table_has_no_duplicate_entries() {
        let dir = TempDir::new().expect("temp dir");
        write_migration(dir.path(), "0000_init.sql", "CREATE TABLE t (id TEXT);");

        let db = dir.path().join("books.db");
        let runner = MigrationRunner::new(dir.path());
        runner.run(&db).expect("first run");
        runner.run(&db).expect("second run");

        let conn = Connection::open(&db).expect("db opened");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM applied_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let db = dir.path().join("books.db");
        let runner = MigrationRunner::new(dir.path().join("nope"));
        assert!(runner.run(&db).is_err());
    }
}
