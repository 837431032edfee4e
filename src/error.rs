//! Error type for world construction and file I/O.
//!
//! Generation itself is total; only constructing a generator with an
//! impossible shape, or reading/writing files, can fail.

use thiserror::Error;

/// Errors surfaced by the generator and its export helpers.
#[derive(Error, Debug)]
pub enum WorldGenError {
    #[error("invalid world dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: usize, height: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}
