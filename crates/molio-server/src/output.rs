//! Turns a built document into a downloadable archive.

use std::io::Write;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use flate2::{write::GzEncoder, Compression};

use crate::assemble::{build_database, AssembleError};
use crate::config::{Config, ResponseConfig};

/// Gzip-compresses `bytes` at `level` (0 to 9).
///
/// # Errors
///
/// Returns the encoder's I/O error.
pub fn gzip(bytes: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::new(level));
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Builds the reference document and compresses it. Nothing is returned
/// unless every step succeeded.
///
/// # Errors
///
/// Returns `AssembleError` from the build, or `AssembleError::Compress`.
pub fn build_archive(config: &Config) -> Result<Vec<u8>, AssembleError> {
    let image = build_database(&config.document)?;
    let archive =
        gzip(&image, config.response.compression_level).map_err(AssembleError::Compress)?;
    tracing::info!(
        database_bytes = image.len(),
        archive_bytes = archive.len(),
        level = config.response.compression_level,
        "compressed document archive"
    );
    Ok(archive)
}

/// Wraps an archive in a download response.
///
/// Header values are checked when configuration is loaded; a value that
/// still fails to parse is dropped with a warning rather than failing the
/// download.
pub fn download_response(archive: Vec<u8>, settings: &ResponseConfig) -> Response {
    let mut response = Response::new(Body::from(archive));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();

    match HeaderValue::from_str(&settings.content_type) {
        Ok(value) => {
            headers.insert(header::CONTENT_TYPE, value);
        }
        Err(e) => tracing::warn!(content_type = %settings.content_type, "invalid content type: {}", e),
    }
    match HeaderValue::from_str(&settings.content_disposition()) {
        Ok(value) => {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Err(e) => tracing::warn!(filename = %settings.filename, "invalid download filename: {}", e),
    }
    if settings.gzip_content_encoding {
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }

    response
}
