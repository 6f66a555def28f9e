use crate::xml::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] crate::crypto::Error),

    #[error("XML serialization error: {0}")]
    Serialize(#[from] quick_xml::SeError),

    #[error("XML processing error: {0}")]
    Xml(#[from] ParseError),

    #[error("Signing task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Engine(String),
}
