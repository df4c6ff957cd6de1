//! Shared value objects and constants for the Molio document generator.
//!
//! A Molio document ("bygningsdelsbeskrivelse", a building-component
//! description) is a root record with a tree of sections underneath it.
//! Sections can be linked to any number of binary attachments through a
//! join record. The types here are plain data; persistence lives in
//! `molio-db`.

use uuid::Uuid;

/// MIME type of the bundled sample attachment.
pub const MIME_PDF: &str = "application/pdf";

/// Content type advertised for the generated archive unless configured otherwise.
pub const DEFAULT_ARCHIVE_CONTENT_TYPE: &str = "application/x-molio-doc-todo";

/// Download filename advertised for the generated archive unless configured otherwise.
pub const DEFAULT_ARCHIVE_FILENAME: &str = "molio.db.gz";

/// The root document record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bygningsdelsbeskrivelse {
    /// Display name.
    pub name: String,
    /// Identifier of this document.
    pub bygningsdelsbeskrivelse_guid: Uuid,
    /// Identifier of the base description version the document derives from.
    pub basisbeskrivelse_version_guid: Uuid,
}

impl Bygningsdelsbeskrivelse {
    /// Creates a document with freshly generated random identifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bygningsdelsbeskrivelse_guid: Uuid::new_v4(),
            basisbeskrivelse_version_guid: Uuid::new_v4(),
        }
    }
}

/// A heading/body node in a document's section tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BygningsdelsbeskrivelseSection {
    /// Row id of the owning document.
    pub bygningsdelsbeskrivelse_id: i64,
    /// Section number within its parent.
    pub section_no: i64,
    /// Section heading.
    pub heading: String,
    /// Body text. Empty unless set.
    pub text: String,
    /// External Molio section identifier, if the section maps to one.
    pub molio_section_guid: Option<Uuid>,
    /// Row id of the parent section. `None` for top-level sections.
    pub parent_id: Option<i64>,
}

impl BygningsdelsbeskrivelseSection {
    /// Creates a top-level section with an empty body.
    pub fn new(bygningsdelsbeskrivelse_id: i64, section_no: i64, heading: impl Into<String>) -> Self {
        Self {
            bygningsdelsbeskrivelse_id,
            section_no,
            heading: heading.into(),
            text: String::new(),
            molio_section_guid: None,
            parent_id: None,
        }
    }

    /// Sets the body text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Places the section under `parent_id`.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Links the section to an external Molio section.
    pub fn with_molio_section_guid(mut self, guid: Uuid) -> Self {
        self.molio_section_guid = Some(guid);
        self
    }
}

/// An opaque binary file that sections can refer to.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name, usually the original filename.
    pub name: String,
    /// MIME type of `content`.
    pub mime_type: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from raw file bytes.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }
}

// Attachment content can be megabytes; keep it out of logs.
impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Join record between a section and an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionAttachment {
    /// Row id of the section.
    pub section_id: i64,
    /// Row id of the attachment.
    pub attachment_id: i64,
}

/// A record read back from the store together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<T> {
    /// Store-assigned primary key.
    pub id: i64,
    /// The persisted values.
    pub record: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_gets_distinct_random_guids() {
        let doc = Bygningsdelsbeskrivelse::new("hej");
        assert_eq!(doc.name, "hej");
        assert_ne!(
            doc.bygningsdelsbeskrivelse_guid,
            doc.basisbeskrivelse_version_guid
        );
        assert_eq!(doc.bygningsdelsbeskrivelse_guid.get_version_num(), 4);
    }

    #[test]
    fn section_defaults_are_empty() {
        let section = BygningsdelsbeskrivelseSection::new(1, 2, "ALMENE SPECIFIKATIONER");
        assert_eq!(section.text, "");
        assert!(section.molio_section_guid.is_none());
        assert!(section.parent_id.is_none());
    }

    #[test]
    fn section_builders_set_fields() {
        let guid = Uuid::new_v4();
        let section = BygningsdelsbeskrivelseSection::new(1, 5, "Generelt")
            .with_text("Lorem ipsum 123")
            .with_parent(7)
            .with_molio_section_guid(guid);
        assert_eq!(section.text, "Lorem ipsum 123");
        assert_eq!(section.parent_id, Some(7));
        assert_eq!(section.molio_section_guid, Some(guid));
    }

    #[test]
    fn attachment_debug_omits_content() {
        let attachment = Attachment::new("sample.pdf", MIME_PDF, vec![0u8; 4096]);
        let rendered = format!("{attachment:?}");
        assert!(rendered.contains("content_len: 4096"));
        assert!(!rendered.contains("[0, 0"));
    }
}
