//! XML-DSig and XAdES namespace and algorithm URIs

/// Namespaces
pub const XMLDSIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const XADES_NAMESPACE: &str = "http://uri.etsi.org/01903/v1.3.2#";

/// Signature algorithm URIs
pub const RSA_SHA1_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const RSA_SHA256_ALGORITHM: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

/// Digest algorithm URIs
pub const SHA1_DIGEST_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const SHA256_DIGEST_ALGORITHM: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

/// Canonicalization and transform URIs
pub const EXCLUSIVE_C14N_ALGORITHM: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const ENVELOPED_SIGNATURE_TRANSFORM: &str =
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Reference type of the XAdES SignedProperties reference
pub const SIGNED_PROPERTIES_TYPE: &str = "http://uri.etsi.org/01903#SignedProperties";

/// Commitment type identifiers (ETSI TS 101 903, section 7.2.6)
pub const PROOF_OF_ORIGIN_URI: &str = "http://uri.etsi.org/01903/v1.2.2#ProofOfOrigin";
pub const PROOF_OF_ORIGIN_DESCRIPTION: &str =
    "Indicates that the signer recognizes to have created, approved and sent the signed data object";

/// MIME type declared for the signed document
pub const XML_MIME_TYPE: &str = "text/xml";

/// Qualified element names used as serialization roots
pub const SIGNATURE_ELEMENT: &str = "ds:Signature";
pub const SIGNED_INFO_ELEMENT: &str = "ds:SignedInfo";
pub const SIGNED_PROPERTIES_ELEMENT: &str = "xades:SignedProperties";
