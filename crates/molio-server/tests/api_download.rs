mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use molio_db::{MolioDoc, RowCounts};
use molio_server::{app, AppState};
use serde_json::Value;
use tower::ServiceExt;

async fn get(state: AppState, uri: &str) -> axum::response::Response {
    app(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(AppState { config: common::test_config() }, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn download_returns_gzipped_reference_document() {
    let response = get(AppState { config: common::test_config() }, "/molio.db.gz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-molio-doc-todo"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"molio.db.gz\""
    );
    assert!(response.headers().get(header::CONTENT_ENCODING).is_none());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let image = common::gunzip(&body);
    assert!(image.starts_with(b"SQLite format 3\0"));

    let (_dir, conn) = common::open_image(&image);
    let repo = MolioDoc::new(&conn);
    assert_eq!(
        repo.row_counts().unwrap(),
        RowCounts {
            documents: 1,
            sections: 3,
            attachments: 1,
            section_attachments: 1,
        }
    );

    let doc = repo.get_bygningsdelsbeskrivelse(1).unwrap().unwrap();
    assert_eq!(doc.record.name, "hej");

    let sections = repo.sections_for_document(doc.id).unwrap();
    let headings: Vec<&str> = sections.iter().map(|s| s.record.heading.as_str()).collect();
    assert_eq!(headings, ["OMFANG", "ALMENE SPECIFIKATIONER", "Generelt"]);
    assert_eq!(sections[2].record.parent_id, Some(sections[1].id));
    assert!(sections.iter().all(|s| s.record.molio_section_guid.is_none()));
}

#[tokio::test]
async fn each_download_gets_fresh_guids() {
    let state = AppState { config: common::test_config() };

    let mut guids = Vec::new();
    for _ in 0..2 {
        let response = get(state.clone(), "/molio.db.gz").await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let (_dir, conn) = common::open_image(&common::gunzip(&body));
        let doc = MolioDoc::new(&conn)
            .get_bygningsdelsbeskrivelse(1)
            .unwrap()
            .unwrap();
        guids.push(doc.record.bygningsdelsbeskrivelse_guid);
    }
    assert_ne!(guids[0], guids[1]);
}

#[tokio::test]
async fn configured_headers_are_used() {
    let mut config = common::test_config();
    config.response.content_type = "application/vnd.sqlite3".to_string();
    config.response.filename = "document.db.gz".to_string();
    config.response.gzip_content_encoding = true;

    let response = get(AppState { config }, "/molio.db.gz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/vnd.sqlite3");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"document.db.gz\""
    );
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
}

#[tokio::test]
async fn missing_attachment_returns_error_without_archive() {
    let mut config = common::test_config();
    config.document.attachment_path = "does/not/exist.pdf".into();

    let response = get(AppState { config }, "/molio.db.gz").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(!body.starts_with(&[0x1f, 0x8b]), "no gzip bytes expected");
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("failed to read attachment"));
}
