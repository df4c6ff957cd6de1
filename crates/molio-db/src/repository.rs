//! Insert and read-back operations for Molio documents.
//!
//! Each insert binds one value object, executes exactly one statement and
//! returns the row id SQLite assigned. Guids are stored as their 16-byte
//! binary form; an absent optional guid is bound as SQL `NULL`.

use molio_types::{
    Attachment, Bygningsdelsbeskrivelse, BygningsdelsbeskrivelseSection, SectionAttachment, Stored,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::StoreError;

/// Repository over a document store connection.
#[derive(Clone, Copy)]
pub struct MolioDoc<'conn> {
    conn: &'conn Connection,
}

/// Number of rows in each template table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    /// Rows in `bygningsdelsbeskrivelse`.
    pub documents: i64,
    /// Rows in `bygningsdelsbeskrivelse_section`.
    pub sections: i64,
    /// Rows in `attachment`.
    pub attachments: i64,
    /// Rows in `bygningsdelsbeskrivelse_section_attachment`.
    pub section_attachments: i64,
}

const SECTION_COLUMNS: &str = "bygningsdelsbeskrivelse_section_id, bygningsdelsbeskrivelse_id, \
     section_no, heading, text, molio_section_guid, parent_id";

impl<'conn> MolioDoc<'conn> {
    /// Wraps a connection whose schema template has already been loaded.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a document header.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure.
    pub fn add_bygningsdelsbeskrivelse(
        &self,
        doc: &Bygningsdelsbeskrivelse,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO bygningsdelsbeskrivelse (
                name,
                bygningsdelsbeskrivelse_guid,
                basisbeskrivelse_version_guid
            ) VALUES (?1, ?2, ?3)",
            params![
                doc.name,
                doc.bygningsdelsbeskrivelse_guid.as_bytes().as_slice(),
                doc.basisbeskrivelse_version_guid.as_bytes().as_slice(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(table = "bygningsdelsbeskrivelse", id, name = %doc.name, "inserted row");
        Ok(id)
    }

    /// Inserts a section. The owning document and the parent section, if
    /// any, must already exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure, including foreign key
    /// violations.
    pub fn add_section(&self, section: &BygningsdelsbeskrivelseSection) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO bygningsdelsbeskrivelse_section (
                bygningsdelsbeskrivelse_id,
                section_no,
                heading,
                text,
                molio_section_guid,
                parent_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                section.bygningsdelsbeskrivelse_id,
                section.section_no,
                section.heading,
                section.text,
                section.molio_section_guid.as_ref().map(|g| g.as_bytes().as_slice()),
                section.parent_id,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(
            table = "bygningsdelsbeskrivelse_section",
            id,
            heading = %section.heading,
            parent_id = ?section.parent_id,
            "inserted row"
        );
        Ok(id)
    }

    /// Inserts an attachment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure.
    pub fn add_attachment(&self, attachment: &Attachment) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO attachment (name, mime_type, content) VALUES (?1, ?2, ?3)",
            params![attachment.name, attachment.mime_type, attachment.content],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(
            table = "attachment",
            id,
            name = %attachment.name,
            bytes = attachment.content.len(),
            "inserted row"
        );
        Ok(id)
    }

    /// Links a section to an attachment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure, including foreign key
    /// violations and duplicate links.
    pub fn add_section_attachment(
        &self,
        section_id: i64,
        attachment_id: i64,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO bygningsdelsbeskrivelse_section_attachment (
                bygningsdelsbeskrivelse_section_id,
                attachment_id
            ) VALUES (?1, ?2)",
            params![section_id, attachment_id],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(
            table = "bygningsdelsbeskrivelse_section_attachment",
            id,
            section_id,
            attachment_id,
            "inserted row"
        );
        Ok(id)
    }

    /// Fetches a document header by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure or
    /// `StoreError::InvalidGuid` if a stored guid is malformed.
    pub fn get_bygningsdelsbeskrivelse(
        &self,
        id: i64,
    ) -> Result<Option<Stored<Bygningsdelsbeskrivelse>>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT name, bygningsdelsbeskrivelse_guid, basisbeskrivelse_version_guid
                 FROM bygningsdelsbeskrivelse
                 WHERE bygningsdelsbeskrivelse_id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, doc_guid, version_guid)) = raw else {
            return Ok(None);
        };

        Ok(Some(Stored {
            id,
            record: Bygningsdelsbeskrivelse {
                name,
                bygningsdelsbeskrivelse_guid: guid_from_blob(
                    "bygningsdelsbeskrivelse_guid",
                    &doc_guid,
                )?,
                basisbeskrivelse_version_guid: guid_from_blob(
                    "basisbeskrivelse_version_guid",
                    &version_guid,
                )?,
            },
        }))
    }

    /// Fetches a section by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure or
    /// `StoreError::InvalidGuid` if a stored guid is malformed.
    pub fn get_section(
        &self,
        id: i64,
    ) -> Result<Option<Stored<BygningsdelsbeskrivelseSection>>, StoreError> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SECTION_COLUMNS} FROM bygningsdelsbeskrivelse_section
                     WHERE bygningsdelsbeskrivelse_section_id = ?1"
                ),
                [id],
                RawSection::from_row,
            )
            .optional()?;
        raw.map(RawSection::into_stored).transpose()
    }

    /// Lists every section of a document in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure or
    /// `StoreError::InvalidGuid` if a stored guid is malformed.
    pub fn sections_for_document(
        &self,
        bygningsdelsbeskrivelse_id: i64,
    ) -> Result<Vec<Stored<BygningsdelsbeskrivelseSection>>, StoreError> {
        self.query_sections(
            &format!(
                "SELECT {SECTION_COLUMNS} FROM bygningsdelsbeskrivelse_section
                 WHERE bygningsdelsbeskrivelse_id = ?1
                 ORDER BY bygningsdelsbeskrivelse_section_id"
            ),
            bygningsdelsbeskrivelse_id,
        )
    }

    /// Lists the direct children of a section in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure or
    /// `StoreError::InvalidGuid` if a stored guid is malformed.
    pub fn children_of(
        &self,
        parent_id: i64,
    ) -> Result<Vec<Stored<BygningsdelsbeskrivelseSection>>, StoreError> {
        self.query_sections(
            &format!(
                "SELECT {SECTION_COLUMNS} FROM bygningsdelsbeskrivelse_section
                 WHERE parent_id = ?1
                 ORDER BY bygningsdelsbeskrivelse_section_id"
            ),
            parent_id,
        )
    }

    /// Fetches an attachment, content included.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure.
    pub fn get_attachment(&self, id: i64) -> Result<Option<Stored<Attachment>>, StoreError> {
        let attachment = self
            .conn
            .query_row(
                "SELECT name, mime_type, content FROM attachment WHERE attachment_id = ?1",
                [id],
                |row| Ok(Attachment::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get(2)?)),
            )
            .optional()?;
        Ok(attachment.map(|record| Stored { id, record }))
    }

    /// Lists the attachment links of a section.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure.
    pub fn attachments_for_section(
        &self,
        section_id: i64,
    ) -> Result<Vec<Stored<SectionAttachment>>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT bygningsdelsbeskrivelse_section_attachment_id, attachment_id
             FROM bygningsdelsbeskrivelse_section_attachment
             WHERE bygningsdelsbeskrivelse_section_id = ?1
             ORDER BY bygningsdelsbeskrivelse_section_attachment_id",
        )?;
        let links = stmt
            .query_map([section_id], |row| {
                Ok(Stored {
                    id: row.get(0)?,
                    record: SectionAttachment {
                        section_id,
                        attachment_id: row.get(1)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    /// Counts the rows in every template table.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` on SQL failure.
    pub fn row_counts(&self) -> Result<RowCounts, StoreError> {
        let counts = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM bygningsdelsbeskrivelse),
                (SELECT COUNT(*) FROM bygningsdelsbeskrivelse_section),
                (SELECT COUNT(*) FROM attachment),
                (SELECT COUNT(*) FROM bygningsdelsbeskrivelse_section_attachment)",
            [],
            |row| {
                Ok(RowCounts {
                    documents: row.get(0)?,
                    sections: row.get(1)?,
                    attachments: row.get(2)?,
                    section_attachments: row.get(3)?,
                })
            },
        )?;
        Ok(counts)
    }

    fn query_sections(
        &self,
        sql: &str,
        key: i64,
    ) -> Result<Vec<Stored<BygningsdelsbeskrivelseSection>>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([key], RawSection::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawSection::into_stored).collect()
    }
}

/// A section row before its guid blob is validated.
struct RawSection {
    id: i64,
    bygningsdelsbeskrivelse_id: i64,
    section_no: i64,
    heading: String,
    text: String,
    molio_section_guid: Option<Vec<u8>>,
    parent_id: Option<i64>,
}

impl RawSection {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            bygningsdelsbeskrivelse_id: row.get(1)?,
            section_no: row.get(2)?,
            heading: row.get(3)?,
            text: row.get(4)?,
            molio_section_guid: row.get(5)?,
            parent_id: row.get(6)?,
        })
    }

    fn into_stored(self) -> Result<Stored<BygningsdelsbeskrivelseSection>, StoreError> {
        let molio_section_guid = self
            .molio_section_guid
            .map(|blob| guid_from_blob("molio_section_guid", &blob))
            .transpose()?;
        Ok(Stored {
            id: self.id,
            record: BygningsdelsbeskrivelseSection {
                bygningsdelsbeskrivelse_id: self.bygningsdelsbeskrivelse_id,
                section_no: self.section_no,
                heading: self.heading,
                text: self.text,
                molio_section_guid,
                parent_id: self.parent_id,
            },
        })
    }
}

fn guid_from_blob(column: &'static str, blob: &[u8]) -> Result<Uuid, StoreError> {
    Uuid::from_slice(blob).map_err(|_| StoreError::InvalidGuid {
        column,
        len: blob.len(),
    })
}
