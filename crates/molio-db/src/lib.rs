//! Storage layer for Molio documents.
//!
//! A document is generated into a fresh SQLite file, read back as raw bytes
//! and shipped to the client. This crate owns that file for the duration of
//! one build: it creates the temporary store, loads the schema template,
//! inserts records, and finally hands over the database image.
//!
//! # Design decisions
//!
//! - **One store per build**: [`DocumentStore`] owns both the temp file and
//!   its single connection. Dropping it on any exit path closes the
//!   connection and deletes the file.
//! - **Foreign keys enforced**: constraint violations come back as
//!   [`StoreError::Database`] instead of leaving a half-valid document.
//! - **Embedded template**: the default schema is compiled into the binary
//!   via `include_str!` so it cannot drift from the insert statements.

mod error;
mod repository;
mod store;
mod template;

pub use error::StoreError;
pub use repository::{MolioDoc, RowCounts};
pub use store::DocumentStore;
pub use template::{apply_template, TEMPLATE_SQL, TEMPLATE_TABLES};
