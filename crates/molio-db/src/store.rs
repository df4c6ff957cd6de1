//! The per-build document store handle.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::repository::MolioDoc;
use crate::template::apply_template;

/// A single-connection SQLite store backed by a temporary file.
///
/// The handle is the only owner of both the connection and the file.
/// [`DocumentStore::into_bytes`] closes the connection before reading the
/// image; dropping the handle without calling it still releases both.
pub struct DocumentStore {
    conn: Connection,
    // Declared after `conn` so the connection is dropped before the file is unlinked.
    file: Option<NamedTempFile>,
}

impl DocumentStore {
    /// Creates an empty store in a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the temp file cannot be created, or
    /// `StoreError::Database` if SQLite cannot open it.
    pub fn create_temporary() -> Result<Self, StoreError> {
        let file = tempfile::Builder::new()
            .prefix("molio-")
            .suffix(".db")
            .tempfile()?;

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(file.path(), flags)?;
        configure(&conn)?;

        tracing::debug!(path = %file.path().display(), "created temporary document store");

        Ok(Self {
            conn,
            file: Some(file),
        })
    }

    /// Creates an in-memory store. It has no byte image; useful for tests
    /// of the repository layer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if SQLite cannot open the database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        Ok(Self { conn, file: None })
    }

    /// Runs a schema script against the store. See [`apply_template`].
    ///
    /// Foreign keys are switched back on afterwards; `sqlite3 .dump` output
    /// turns them off in its first line.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Template` or `StoreError::MissingTable`.
    pub fn load_template(&self, sql: &str) -> Result<(), StoreError> {
        apply_template(&self.conn, sql)?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    /// Borrows the repository for this store.
    pub fn repository(&self) -> MolioDoc<'_> {
        MolioDoc::new(&self.conn)
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Path of the backing file, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|file| file.path())
    }

    /// Closes the connection and returns the store's on-disk byte image.
    ///
    /// The temporary file is deleted once the bytes have been read.
    /// In-memory stores have no image and yield an empty vector.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Close` if SQLite refuses to close the
    /// connection, or `StoreError::Io` if the file cannot be read.
    pub fn into_bytes(self) -> Result<Vec<u8>, StoreError> {
        let Self { conn, file } = self;
        conn.close().map_err(|(_, e)| StoreError::Close(e))?;

        let Some(file) = file else {
            return Ok(Vec::new());
        };

        let bytes = std::fs::read(file.path())?;
        tracing::debug!(bytes = bytes.len(), "read document store image");
        Ok(bytes)
    }
}

fn configure(conn: &Connection) -> Result<(), rusqlite::Error> {
    // A rollback journal keeps every committed page in the main file, so the
    // image read after close is complete. In-memory databases report "memory".
    let journal_mode: String =
        conn.query_row("PRAGMA journal_mode = DELETE;", [], |row| row.get(0))?;
    if journal_mode != "delete" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!(
                "failed to set DELETE journal mode, got: {}",
                journal_mode
            )),
        ));
    }
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}
