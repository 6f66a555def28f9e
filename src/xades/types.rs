//! Serializable XML-DSig / XAdES structures
//!
//! Names carry their `ds:` / `xades:` prefixes; namespace declarations are
//! optional attributes so the same structs serve for standalone
//! canonicalization and for the final, nested signature.

use serde::Serialize;

/// Generic XML element with algorithm attribute
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmElement {
    #[serde(rename = "@Algorithm")]
    pub algorithm: String,
}

impl AlgorithmElement {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Signature {
    #[serde(rename = "@xmlns:ds")]
    pub xmlns_ds: String,

    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "ds:SignedInfo")]
    pub signed_info: SignedInfo,

    #[serde(rename = "ds:SignatureValue")]
    pub signature_value: SignatureValue,

    #[serde(rename = "ds:KeyInfo")]
    pub key_info: KeyInfo,

    #[serde(rename = "ds:Object")]
    pub object: Object,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedInfo {
    #[serde(rename = "@xmlns:ds", skip_serializing_if = "Option::is_none")]
    pub xmlns_ds: Option<String>,

    #[serde(rename = "ds:CanonicalizationMethod")]
    pub canonicalization_method: AlgorithmElement,

    #[serde(rename = "ds:SignatureMethod")]
    pub signature_method: AlgorithmElement,

    #[serde(rename = "ds:Reference")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    #[serde(rename = "@Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "@Type", skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,

    #[serde(rename = "@URI")]
    pub uri: String,

    #[serde(rename = "ds:Transforms")]
    pub transforms: Transforms,

    #[serde(rename = "ds:DigestMethod")]
    pub digest_method: AlgorithmElement,

    #[serde(rename = "ds:DigestValue")]
    pub digest_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transforms {
    #[serde(rename = "ds:Transform")]
    pub transform: Vec<AlgorithmElement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureValue {
    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyInfo {
    #[serde(rename = "ds:X509Data")]
    pub x509_data: X509Data,
}

#[derive(Debug, Clone, Serialize)]
pub struct X509Data {
    #[serde(rename = "ds:X509Certificate")]
    pub x509_certificate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Object {
    #[serde(rename = "xades:QualifyingProperties")]
    pub qualifying_properties: QualifyingProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualifyingProperties {
    #[serde(rename = "@xmlns:xades")]
    pub xmlns_xades: String,

    #[serde(rename = "@Target")]
    pub target: String,

    #[serde(rename = "xades:SignedProperties")]
    pub signed_properties: SignedProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedProperties {
    #[serde(rename = "@xmlns:ds", skip_serializing_if = "Option::is_none")]
    pub xmlns_ds: Option<String>,

    #[serde(rename = "@xmlns:xades", skip_serializing_if = "Option::is_none")]
    pub xmlns_xades: Option<String>,

    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "xades:SignedSignatureProperties")]
    pub signed_signature_properties: SignedSignatureProperties,

    #[serde(rename = "xades:SignedDataObjectProperties")]
    pub signed_data_object_properties: SignedDataObjectProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedSignatureProperties {
    #[serde(rename = "xades:SigningTime")]
    pub signing_time: String,

    #[serde(rename = "xades:SigningCertificate")]
    pub signing_certificate: SigningCertificate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SigningCertificate {
    #[serde(rename = "xades:Cert")]
    pub cert: Cert,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cert {
    #[serde(rename = "xades:CertDigest")]
    pub cert_digest: CertDigest,

    #[serde(rename = "xades:IssuerSerial")]
    pub issuer_serial: IssuerSerial,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertDigest {
    #[serde(rename = "ds:DigestMethod")]
    pub digest_method: AlgorithmElement,

    #[serde(rename = "ds:DigestValue")]
    pub digest_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuerSerial {
    #[serde(rename = "ds:X509IssuerName")]
    pub issuer_name: String,

    #[serde(rename = "ds:X509SerialNumber")]
    pub serial_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedDataObjectProperties {
    #[serde(rename = "xades:DataObjectFormat")]
    pub data_object_format: DataObjectFormat,

    #[serde(rename = "xades:CommitmentTypeIndication")]
    pub commitment_type_indications: Vec<CommitmentTypeIndication>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataObjectFormat {
    #[serde(rename = "@ObjectReference")]
    pub object_reference: String,

    #[serde(rename = "xades:MimeType")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitmentTypeIndication {
    #[serde(rename = "xades:CommitmentTypeId")]
    pub commitment_type_id: CommitmentTypeId,

    #[serde(rename = "xades:AllSignedDataObjects")]
    pub all_signed_data_objects: (),
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitmentTypeId {
    #[serde(rename = "xades:Identifier")]
    pub identifier: String,

    #[serde(rename = "xades:Description")]
    pub description: String,
}
