use flate2::read::GzDecoder;
use molio_server::config::Config;
use std::io::Read;
use std::path::PathBuf;

pub fn sample_pdf() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/sample.pdf")
}

/// Default configuration pointing at the bundled sample attachment.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.document.attachment_path = sample_pdf();
    config
}

pub fn gunzip(bytes: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .expect("archive should be valid gzip");
    decoded
}

/// Writes a database image to disk and opens it.
pub fn open_image(image: &[u8]) -> (tempfile::TempDir, rusqlite::Connection) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("molio.db");
    std::fs::write(&path, image).expect("failed to write image");
    let conn = rusqlite::Connection::open(&path).expect("failed to open image");
    (dir, conn)
}
