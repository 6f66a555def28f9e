use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ErrorKind, SigningError};

/// Outcome of one signing call.
///
/// A successful result always carries signed XML and no error message; a
/// failed one carries a message and no XML. The two constructors are the only
/// way to build a result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResult {
    success: bool,
    signed_xml: String,
    error_message: String,
    error_kind: Option<ErrorKind>,
    access_key: String,
    created_at: DateTime<Utc>,
    processing_time_ms: u64,
}

impl SignatureResult {
    /// Successful result. An empty `signed_xml` yields a signing engine failure instead.
    pub fn success(
        signed_xml: impl Into<String>,
        access_key: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        let signed_xml = signed_xml.into();
        if signed_xml.is_empty() {
            return Self {
                success: false,
                signed_xml,
                error_message: "error in digital signature: signing produced no output".into(),
                error_kind: Some(ErrorKind::SigningEngineFailure),
                access_key: access_key.into(),
                created_at: Utc::now(),
                processing_time_ms,
            };
        }

        Self {
            success: true,
            signed_xml,
            error_message: String::new(),
            error_kind: None,
            access_key: access_key.into(),
            created_at: Utc::now(),
            processing_time_ms,
        }
    }

    pub fn failure(
        error: &SigningError,
        access_key: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            signed_xml: String::new(),
            error_message: error.to_string(),
            error_kind: Some(error.kind()),
            access_key: access_key.into(),
            created_at: Utc::now(),
            processing_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Signed document; empty for failed results
    pub fn signed_xml(&self) -> &str {
        &self.signed_xml
    }

    /// Diagnostic text; empty for successful results
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Correlation token supplied by the caller
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }

    pub fn into_signed_xml(self) -> Option<String> {
        self.success.then_some(self.signed_xml)
    }
}
