use serde::Serialize;
use std::path::PathBuf;

use crate::certificate::LoadError;
use crate::xades::SignError;
use crate::xml::ParseError;

/// Failure categories reported alongside the message of a failed result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    CertificateNotFound,
    CertificateLoadFailure,
    XmlParseFailure,
    SigningEngineFailure,
    PostSignValidationFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("default certificate not configured")]
    DefaultCertificateNotConfigured,

    #[error("invalid XML content: {0}")]
    XmlParse(#[from] ParseError),

    #[error("certificate not found at: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("failed to load certificate: {0}")]
    CertificateLoad(#[from] LoadError),

    #[error("error in digital signature: {0}")]
    SigningEngine(#[from] SignError),

    #[error("generated signature is not valid")]
    PostSignValidation,
}

impl SigningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SigningError::InvalidInput(_) | SigningError::DefaultCertificateNotConfigured => {
                ErrorKind::InvalidInput
            }
            SigningError::XmlParse(_) => ErrorKind::XmlParseFailure,
            SigningError::CertificateNotFound(_) => ErrorKind::CertificateNotFound,
            SigningError::CertificateLoad(_) => ErrorKind::CertificateLoadFailure,
            SigningError::SigningEngine(_) => ErrorKind::SigningEngineFailure,
            SigningError::PostSignValidation => ErrorKind::PostSignValidationFailure,
        }
    }
}
