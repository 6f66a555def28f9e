//! XML preflight and canonicalization
//!
//! Raw text is parsed into a [`Document`] before any cryptographic work starts.
//! Parsing is strict: the first well-formedness violation ends the call and
//! nothing is recovered.

mod c14n;
mod document;
mod entities;
mod error;

pub use c14n::canonicalize;
pub use document::{Document, Element};
pub use error::ParseError;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse raw XML text into a [`Document`].
pub fn parse(text: impl AsRef<str>) -> Result<Document> {
    Document::parse(text.as_ref())
}
