//! Error types for the document store.

/// Errors that can occur while building or reading a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A SQL statement failed, including constraint violations.
    #[error("document store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Creating or reading the backing file failed.
    #[error("document store io error: {0}")]
    Io(#[from] std::io::Error),

    /// The schema template could not be executed.
    #[error("failed to load schema template: {source}")]
    Template {
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// The schema template ran but did not create a required table.
    #[error("schema template did not create table '{0}'")]
    MissingTable(String),

    /// A stored guid blob was not 16 bytes long.
    #[error("column '{column}' holds a {len}-byte value, expected a 16-byte guid")]
    InvalidGuid {
        /// Column the value was read from.
        column: &'static str,
        /// Actual blob length.
        len: usize,
    },

    /// Closing the connection before reading the image failed.
    #[error("failed to close document store: {0}")]
    Close(rusqlite::Error),
}
