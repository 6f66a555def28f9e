//! Built-in XAdES-BES engine for enveloped signatures
//!
//! 1. Digest of the exclusive canonical form of the document (the signature is
//!    not yet part of it, which is what the enveloped-signature transform yields)
//! 2. Digest of the canonical `SignedProperties`
//! 3. RSA signature over the canonical `SignedInfo` referencing both digests
//! 4. `ds:Signature` appended as last child of the document root

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use quick_xml::se::to_string_with_root as xml_to_string;
use tracing::debug;
use uuid::Uuid;

use super::constants::*;
use super::types::*;
use super::{CommitmentType, Packaging, SignError, SignatureParameters, SigningEngine};
use crate::certificate::CertificateIdentity;
use crate::crypto::rsa::{self, RsaPrivateKey};
use crate::xml::{Document, canonicalize};

/// Element identifiers of one signature, unique per call
struct SignatureIds {
    signature: String,
    signed_properties: String,
    document_reference: String,
    signature_value: String,
}

impl SignatureIds {
    fn new() -> Self {
        let id = Uuid::new_v4();
        Self {
            signature: format!("Signature-{id}"),
            signed_properties: format!("SignedProperties-{id}"),
            document_reference: format!("Reference-{id}"),
            signature_value: format!("SignatureValue-{id}"),
        }
    }
}

/// XAdES-BES signer backed by OpenSSL
#[derive(Debug, Clone, Copy, Default)]
pub struct XadesEngine;

impl SigningEngine for XadesEngine {
    fn sign(
        &self,
        document: &Document,
        identity: &CertificateIdentity,
        params: &SignatureParameters,
    ) -> Result<Document, SignError> {
        match params.packaging() {
            Packaging::Enveloped => {}
        }

        let private_key = RsaPrivateKey::from_pkey(identity.private_key().clone())?;
        let algorithm = params.algorithm();
        let hash_alg = algorithm.hash_alg();
        let ids = SignatureIds::new();

        let document_c14n = document.canonicalize()?;
        let document_digest = BASE64.encode(hash_alg.hash(document_c14n.as_bytes())?);
        debug!(
            "Document digest computed over {} canonical bytes",
            document_c14n.len()
        );

        let mut signed_properties = signed_properties(identity, params, &ids)?;
        let signed_properties_xml = xml_to_string(SIGNED_PROPERTIES_ELEMENT, &signed_properties)?;
        let signed_properties_c14n = canonicalize(&signed_properties_xml, None)?;
        let signed_properties_digest =
            BASE64.encode(hash_alg.hash(signed_properties_c14n.as_bytes())?);

        let document_ref = Reference {
            id: Some(ids.document_reference.clone()),
            reference_type: None,
            uri: String::new(),
            transforms: Transforms {
                transform: vec![
                    AlgorithmElement::new(ENVELOPED_SIGNATURE_TRANSFORM),
                    AlgorithmElement::new(params.canonicalization_uri()),
                ],
            },
            digest_method: AlgorithmElement::new(algorithm.digest_uri()),
            digest_value: document_digest,
        };

        let properties_ref = Reference {
            id: None,
            reference_type: Some(SIGNED_PROPERTIES_TYPE.into()),
            uri: format!("#{}", ids.signed_properties),
            transforms: Transforms {
                transform: vec![AlgorithmElement::new(params.canonicalization_uri())],
            },
            digest_method: AlgorithmElement::new(algorithm.digest_uri()),
            digest_value: signed_properties_digest,
        };

        let mut signed_info = SignedInfo {
            xmlns_ds: Some(XMLDSIG_NAMESPACE.into()),
            canonicalization_method: AlgorithmElement::new(params.canonicalization_uri()),
            signature_method: AlgorithmElement::new(algorithm.signature_uri()),
            references: vec![document_ref, properties_ref],
        };

        // Sign the canonicalized SignedInfo, not the document
        let signed_info_xml = xml_to_string(SIGNED_INFO_ELEMENT, &signed_info)?;
        let signed_info_c14n = canonicalize(&signed_info_xml, None)?;
        let signature = rsa::sign(&private_key, signed_info_c14n.as_bytes(), hash_alg)?;

        // Inside ds:Signature the namespaces come from the ancestors
        signed_info.xmlns_ds = None;
        signed_properties.xmlns_ds = None;
        signed_properties.xmlns_xades = None;

        let signature = Signature {
            xmlns_ds: XMLDSIG_NAMESPACE.into(),
            id: ids.signature.clone(),
            signed_info,
            signature_value: SignatureValue {
                id: ids.signature_value,
                value: BASE64.encode(signature.as_bytes()),
            },
            key_info: KeyInfo {
                x509_data: X509Data {
                    x509_certificate: BASE64.encode(identity.certificate_der()),
                },
            },
            object: Object {
                qualifying_properties: QualifyingProperties {
                    xmlns_xades: XADES_NAMESPACE.into(),
                    target: format!("#{}", ids.signature),
                    signed_properties,
                },
            },
        };

        let signature_xml = xml_to_string(SIGNATURE_ELEMENT, &signature)?;
        Ok(document.append_to_root(&signature_xml)?)
    }
}

fn signed_properties(
    identity: &CertificateIdentity,
    params: &SignatureParameters,
    ids: &SignatureIds,
) -> Result<SignedProperties, SignError> {
    let algorithm = params.algorithm();
    let cert_digest = algorithm.hash_alg().hash(identity.certificate_der())?;

    Ok(SignedProperties {
        xmlns_ds: Some(XMLDSIG_NAMESPACE.into()),
        xmlns_xades: Some(XADES_NAMESPACE.into()),
        id: ids.signed_properties.clone(),
        signed_signature_properties: SignedSignatureProperties {
            signing_time: params.signing_time_xml(),
            signing_certificate: SigningCertificate {
                cert: Cert {
                    cert_digest: CertDigest {
                        digest_method: AlgorithmElement::new(algorithm.digest_uri()),
                        digest_value: BASE64.encode(cert_digest),
                    },
                    issuer_serial: IssuerSerial {
                        issuer_name: identity.issuer().to_owned(),
                        serial_number: identity.serial_number().to_owned(),
                    },
                },
            },
        },
        signed_data_object_properties: SignedDataObjectProperties {
            data_object_format: DataObjectFormat {
                object_reference: format!("#{}", ids.document_reference),
                mime_type: XML_MIME_TYPE.into(),
            },
            commitment_type_indications: params
                .commitments()
                .iter()
                .map(commitment_indication)
                .collect(),
        },
    })
}

fn commitment_indication(commitment: &CommitmentType) -> CommitmentTypeIndication {
    CommitmentTypeIndication {
        commitment_type_id: CommitmentTypeId {
            identifier: commitment.identifier().into(),
            description: commitment.description().into(),
        },
        all_signed_data_objects: (),
    }
}
