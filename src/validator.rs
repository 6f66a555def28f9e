//! Structural signature validator
//!
//! Checks that a document carries signature elements and a non-empty
//! `SignatureValue`. There is no cryptographic re-verification here: a `true`
//! result says nothing about who signed the document or whether it was
//! modified afterwards.

use tracing::{debug, warn};

use crate::xml::{self, Document, ParseError};

/// Local-name fragments that mark an element as part of a signature.
/// Matching is by substring and ignores namespaces.
pub const SIGNATURE_MARKERS: [&str; 3] = ["Signature", "SignedInfo", "SignatureValue"];

const SIGNATURE_VALUE_ELEMENT: &str = "SignatureValue";

/// Outcome of a structural check
#[derive(Debug)]
pub enum StructuralCheck {
    Valid,
    /// The text is not well-formed XML
    NotXml(ParseError),
    /// No element name contains any of [`SIGNATURE_MARKERS`]
    MissingSignature,
    /// No element is named exactly `SignatureValue`
    MissingSignatureValue,
    /// The first `SignatureValue` element has no text content
    EmptySignatureValue,
}

impl StructuralCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, StructuralCheck::Valid)
    }
}

/// Inspect `signed_text` and report why it is or is not structurally signed.
pub fn inspect(signed_text: &str) -> StructuralCheck {
    match xml::parse(signed_text) {
        Ok(document) => inspect_document(&document),
        Err(e) => {
            warn!("Signed document is not well-formed XML: {e}");
            StructuralCheck::NotXml(e)
        }
    }
}

pub fn inspect_document(document: &Document) -> StructuralCheck {
    let has_signature_element = document.elements().iter().any(|element| {
        SIGNATURE_MARKERS
            .iter()
            .any(|marker| element.local_name().contains(marker))
    });
    if !has_signature_element {
        warn!("No signature element found in document");
        return StructuralCheck::MissingSignature;
    }

    match document.find(SIGNATURE_VALUE_ELEMENT) {
        None => {
            warn!("Signature present but no SignatureValue element");
            StructuralCheck::MissingSignatureValue
        }
        Some(value) if value.text_content().trim().is_empty() => {
            warn!("SignatureValue element is empty");
            StructuralCheck::EmptySignatureValue
        }
        Some(_) => {
            debug!("Signature structure present");
            StructuralCheck::Valid
        }
    }
}

/// `true` if `signed_text` is well-formed XML with signature elements and a
/// non-empty `SignatureValue`. Never fails.
pub fn validate(signed_text: &str) -> bool {
    inspect(signed_text).is_valid()
}
