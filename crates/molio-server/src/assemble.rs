//! Builds the reference Molio document into a fresh store.
//!
//! The document graph is fixed: one header, three sections where
//! "Generelt" sits under "ALMENE SPECIFIKATIONER", the sample PDF, and a
//! link between "Generelt" and the PDF. Each insert feeds its row id into
//! the records that reference it.

use std::path::{Path, PathBuf};

use molio_db::{DocumentStore, MolioDoc, StoreError, TEMPLATE_SQL};
use molio_types::{Attachment, Bygningsdelsbeskrivelse, BygningsdelsbeskrivelseSection, MIME_PDF};
use thiserror::Error;

use crate::config::DocumentConfig;

/// Errors that abort a document build.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The configured schema script could not be read.
    #[error("failed to read schema template {}: {source}", .path.display())]
    ReadSchema {
        /// Configured schema path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The attachment source file could not be read.
    #[error("failed to read attachment {}: {source}", .path.display())]
    ReadAttachment {
        /// Configured attachment path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Compressing the store image failed.
    #[error("failed to compress document: {0}")]
    Compress(std::io::Error),
}

/// Row ids produced by [`populate_reference_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceIds {
    /// The "hej" document header.
    pub document_id: i64,
    /// Section 1, "OMFANG".
    pub omfang_id: i64,
    /// Section 2, "ALMENE SPECIFIKATIONER".
    pub almene_specifikationer_id: i64,
    /// Section 5, "Generelt", a child of "ALMENE SPECIFIKATIONER".
    pub generelt_id: i64,
    /// The sample PDF.
    pub attachment_id: i64,
    /// Link between "Generelt" and the sample PDF.
    pub section_attachment_id: i64,
}

/// Inserts the reference document graph.
///
/// # Errors
///
/// Returns `AssembleError::ReadAttachment` if `attachment_path` cannot be
/// read, or `AssembleError::Store` if any insert fails.
pub fn populate_reference_document(
    repo: &MolioDoc<'_>,
    attachment_path: &Path,
) -> Result<ReferenceIds, AssembleError> {
    let document_id = repo.add_bygningsdelsbeskrivelse(&Bygningsdelsbeskrivelse::new("hej"))?;

    let omfang_id = repo.add_section(&BygningsdelsbeskrivelseSection::new(
        document_id,
        1,
        "OMFANG",
    ))?;

    let almene_specifikationer_id = repo.add_section(&BygningsdelsbeskrivelseSection::new(
        document_id,
        2,
        "ALMENE SPECIFIKATIONER",
    ))?;

    let generelt_id = repo.add_section(
        &BygningsdelsbeskrivelseSection::new(document_id, 5, "Generelt")
            .with_text("Lorem ipsum 123")
            .with_parent(almene_specifikationer_id),
    )?;

    let content = std::fs::read(attachment_path).map_err(|source| AssembleError::ReadAttachment {
        path: attachment_path.to_path_buf(),
        source,
    })?;
    let attachment_id = repo.add_attachment(&Attachment::new("sample.pdf", MIME_PDF, content))?;

    let section_attachment_id = repo.add_section_attachment(generelt_id, attachment_id)?;

    Ok(ReferenceIds {
        document_id,
        omfang_id,
        almene_specifikationer_id,
        generelt_id,
        attachment_id,
        section_attachment_id,
    })
}

/// Builds the reference document in a temporary store and returns the
/// store's on-disk image. The temporary file is gone when this returns,
/// whether it succeeds or not.
///
/// # Errors
///
/// Returns `AssembleError` if the schema or attachment cannot be read or
/// any store operation fails.
pub fn build_database(config: &DocumentConfig) -> Result<Vec<u8>, AssembleError> {
    let schema = match &config.schema_path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| AssembleError::ReadSchema {
            path: path.clone(),
            source,
        })?,
        None => TEMPLATE_SQL.to_string(),
    };

    let store = DocumentStore::create_temporary()?;
    store.load_template(&schema)?;

    let ids = populate_reference_document(&store.repository(), &config.attachment_path)?;
    tracing::debug!(?ids, "reference document populated");

    let image = store.into_bytes()?;
    tracing::info!(bytes = image.len(), "built document database");
    Ok(image)
}
