/// Host-level errors: catalog, asset and log-file loading.
///
/// The simulation itself never fails; only the code that talks to the
/// filesystem returns these.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("catalog not found: {0}")]
    CatalogMissing(PathBuf),

    #[error("catalog must contain exactly {expected} entries, got {actual}")]
    CatalogSize { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GameError>;
