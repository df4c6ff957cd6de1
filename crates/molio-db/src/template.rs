//! Schema template loading.
//!
//! Every document store starts empty and is initialized by running a schema
//! script verbatim. The bundled script is embedded at compile time; callers
//! may supply a different one read from disk.

use rusqlite::Connection;

use crate::error::StoreError;

/// The bundled schema template.
pub const TEMPLATE_SQL: &str = include_str!("template.sql");

/// Tables the insert statements depend on.
pub const TEMPLATE_TABLES: &[&str] = &[
    "bygningsdelsbeskrivelse",
    "bygningsdelsbeskrivelse_section",
    "attachment",
    "bygningsdelsbeskrivelse_section_attachment",
];

/// Executes `sql` against `conn` verbatim and checks the required tables
/// exist.
///
/// The script may manage its own transaction, as `sqlite3 .dump` output
/// does. If it fails while one of its transactions is still open, that
/// transaction is rolled back so the connection returns to autocommit.
///
/// # Errors
///
/// Returns `StoreError::Template` if the script fails, or
/// `StoreError::MissingTable` if it succeeds without creating one of
/// [`TEMPLATE_TABLES`].
pub fn apply_template(conn: &Connection, sql: &str) -> Result<(), StoreError> {
    if let Err(source) = conn.execute_batch(sql) {
        if !conn.is_autocommit() {
            if let Err(e) = conn.execute_batch("ROLLBACK;") {
                tracing::warn!("failed to roll back schema template: {}", e);
            }
        }
        return Err(StoreError::Template { source });
    }

    for table in TEMPLATE_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::MissingTable((*table).to_string()));
        }
    }

    tracing::debug!(tables = TEMPLATE_TABLES.len(), "schema template applied");
    Ok(())
}
