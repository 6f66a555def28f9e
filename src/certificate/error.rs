use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Certificate file not found or not readable: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Certificate file is {size} bytes, expected between {min} and {max} bytes")]
    SizeOutOfBounds { size: u64, min: u64, max: u64 },

    #[error("Failed to decode PKCS#12 container: {0}")]
    DecodeFailure(String),

    #[error("Certificate expired on {0}")]
    Expired(DateTime<Utc>),

    #[error("Certificate has no associated private key")]
    MissingPrivateKey,

    #[error("I/O error reading certificate: {0}")]
    Io(#[from] std::io::Error),
}
