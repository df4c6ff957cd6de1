use molio_db::{DocumentStore, RowCounts, TEMPLATE_SQL};
use molio_types::{Attachment, Bygningsdelsbeskrivelse, BygningsdelsbeskrivelseSection};
use rusqlite::Connection;

#[test]
fn insert_ids_are_positive_and_increasing() {
    let store = DocumentStore::create_temporary().expect("failed to create store");
    store.load_template(TEMPLATE_SQL).expect("failed to load template");
    let repo = store.repository();

    let doc_id = repo
        .add_bygningsdelsbeskrivelse(&Bygningsdelsbeskrivelse::new("hej"))
        .expect("failed to insert document");
    assert!(doc_id > 0);

    let mut previous = 0;
    for (no, heading) in [(1, "OMFANG"), (2, "ALMENE SPECIFIKATIONER"), (3, "UDFØRELSE")] {
        let id = repo
            .add_section(&BygningsdelsbeskrivelseSection::new(doc_id, no, heading))
            .expect("failed to insert section");
        assert!(id > previous, "section ids should increase: {id} <= {previous}");
        previous = id;
    }
}

#[test]
fn section_tree_round_trips_through_the_file_image() {
    let store = DocumentStore::create_temporary().expect("failed to create store");
    store.load_template(TEMPLATE_SQL).expect("failed to load template");
    let repo = store.repository();

    let doc_id = repo
        .add_bygningsdelsbeskrivelse(&Bygningsdelsbeskrivelse::new("hej"))
        .expect("failed to insert document");
    let parent_id = repo
        .add_section(&BygningsdelsbeskrivelseSection::new(doc_id, 2, "ALMENE SPECIFIKATIONER"))
        .expect("failed to insert parent");
    let child_id = repo
        .add_section(
            &BygningsdelsbeskrivelseSection::new(doc_id, 5, "Generelt")
                .with_text("Lorem ipsum 123")
                .with_parent(parent_id),
        )
        .expect("failed to insert child");
    let attachment_id = repo
        .add_attachment(&Attachment::new("notes.txt", "text/plain", b"hello".to_vec()))
        .expect("failed to insert attachment");
    repo.add_section_attachment(child_id, attachment_id)
        .expect("failed to link attachment");

    let image = store.into_bytes().expect("failed to read image");

    // Reopen the image from a fresh file, as a client would.
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("copy.db");
    std::fs::write(&path, &image).expect("failed to write copy");
    let conn = Connection::open(&path).expect("failed to open copy");
    let repo = molio_db::MolioDoc::new(&conn);

    let child = repo
        .get_section(child_id)
        .expect("failed to query child")
        .expect("child should exist");
    assert_eq!(child.record.parent_id, Some(parent_id));
    assert_eq!(child.record.text, "Lorem ipsum 123");
    assert_eq!(child.record.molio_section_guid, None);

    let children = repo.children_of(parent_id).expect("failed to list children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child_id);

    let sections = repo
        .sections_for_document(doc_id)
        .expect("failed to list sections");
    let headings: Vec<&str> = sections.iter().map(|s| s.record.heading.as_str()).collect();
    assert_eq!(headings, ["ALMENE SPECIFIKATIONER", "Generelt"]);

    let attachment = repo
        .get_attachment(attachment_id)
        .expect("failed to query attachment")
        .expect("attachment should exist");
    assert_eq!(attachment.record.content, b"hello");

    assert_eq!(
        repo.row_counts().expect("failed to count rows"),
        RowCounts {
            documents: 1,
            sections: 2,
            attachments: 1,
            section_attachments: 1,
        }
    );
}

#[test]
fn unknown_ids_read_back_as_none() {
    let store = DocumentStore::open_in_memory().expect("failed to create store");
    store.load_template(TEMPLATE_SQL).expect("failed to load template");
    let repo = store.repository();

    assert!(repo.get_bygningsdelsbeskrivelse(1).expect("query failed").is_none());
    assert!(repo.get_section(1).expect("query failed").is_none());
    assert!(repo.get_attachment(1).expect("query failed").is_none());
    assert!(repo.attachments_for_section(1).expect("query failed").is_empty());
}
