mod common;

use common::*;
use std::sync::Arc;
use xades_signer::certificate::CertificateIdentity;
use xades_signer::config::SignatureConfig;
use xades_signer::xades::{SignError, SignatureParameters, SigningAdapter, SigningEngine};
use xades_signer::xml::Document;
use xades_signer::{ErrorKind, SigningService};

const ACCESS_KEY: &str = "test-key";

struct FailingEngine;

impl SigningEngine for FailingEngine {
    fn sign(
        &self,
        _document: &Document,
        _identity: &CertificateIdentity,
        _params: &SignatureParameters,
    ) -> Result<Document, SignError> {
        Err(SignError::Engine("hardware token unavailable".into()))
    }
}

/// Returns the document untouched, without any signature
struct UnsignedEngine;

impl SigningEngine for UnsignedEngine {
    fn sign(
        &self,
        document: &Document,
        _identity: &CertificateIdentity,
        _params: &SignatureParameters,
    ) -> Result<Document, SignError> {
        Ok(document.clone())
    }
}

#[tokio::test]
async fn test_sign_with_explicit_certificate() {
    let cert = test_certificate();
    let service = SigningService::default();

    let result = service
        .sign_with_certificate(TEST_XML, cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(result.is_success(), "{}", result.error_message());
    assert!(result.signed_xml().contains("<ds:Signature"));
    assert!(result.signed_xml().contains("<ds:SignatureValue"));
    assert!(result.error_message().is_empty());
    assert_eq!(result.error_kind(), None);
    assert_eq!(result.access_key(), ACCESS_KEY);
    assert!(service.validate_signature(result.signed_xml()));
}

#[tokio::test]
async fn test_sign_with_uncommon_key_size() {
    let cert = certificate_with_key_size(1536);
    let service = SigningService::default();

    let result = service
        .sign_with_certificate(TEST_XML, cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(result.is_success(), "{}", result.error_message());
    assert!(service.validate_signature(result.signed_xml()));
}

#[tokio::test]
async fn test_sign_document_with_internal_entities() {
    let cert = test_certificate();
    let service = SigningService::default();
    let xml = r#"<!DOCTYPE test [<!ENTITY org "Acme">]><test>&org;</test>"#;

    let result = service
        .sign_with_certificate(xml, cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(result.is_success(), "{}", result.error_message());
    assert!(result.signed_xml().starts_with(r#"<!DOCTYPE test [<!ENTITY org "Acme">]><test>&org;<ds:Signature"#));
}

#[tokio::test]
async fn test_sign_without_default_certificate() {
    let service = SigningService::default();

    let result = service.sign(TEST_XML, ACCESS_KEY).await;

    assert!(!result.is_success());
    assert_eq!(result.error_message(), "default certificate not configured");
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput));
    assert!(result.signed_xml().is_empty());
    assert_eq!(result.access_key(), ACCESS_KEY);
}

#[tokio::test]
async fn test_sign_invalid_xml() {
    let cert = test_certificate();
    let service = SigningService::default();

    let result = service
        .sign_with_certificate("not xml", cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(!result.is_success());
    assert!(result.error_message().starts_with("invalid XML content"));
    assert_eq!(result.error_kind(), Some(ErrorKind::XmlParseFailure));
}

#[tokio::test]
async fn test_sign_empty_input() {
    let cert = test_certificate();
    let service = SigningService::default();

    for input in ["", "   \n\t"] {
        let result = service
            .sign_with_certificate(input, cert.path_str(), cert.password, ACCESS_KEY)
            .await;

        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput));
    }
}

#[tokio::test]
async fn test_xml_checked_before_certificate_existence() {
    let service = SigningService::default();

    let result = service
        .sign_with_certificate("<a><b></a>", "/nonexistent/cert.p12", "pw", ACCESS_KEY)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::XmlParseFailure));
}

#[tokio::test]
async fn test_default_path_checks_xml_before_certificate_existence() {
    let service = SigningService::default();
    service
        .set_default_certificate("/nonexistent/cert.p12", "pw")
        .unwrap();

    let result = service.sign("<a><b></a>", ACCESS_KEY).await;

    assert!(!result.is_success());
    assert_eq!(result.error_kind(), Some(ErrorKind::XmlParseFailure));
}

#[tokio::test]
async fn test_sign_with_missing_certificate() {
    let service = SigningService::default();

    let result = service
        .sign_with_certificate(TEST_XML, "/nonexistent/cert.p12", "pw", ACCESS_KEY)
        .await;

    assert!(!result.is_success());
    assert_eq!(
        result.error_message(),
        "certificate not found at: /nonexistent/cert.p12"
    );
    assert_eq!(result.error_kind(), Some(ErrorKind::CertificateNotFound));
}

#[tokio::test]
async fn test_sign_with_empty_explicit_path() {
    let service = SigningService::default();

    let result = service
        .sign_with_certificate(TEST_XML, "", "pw", ACCESS_KEY)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn test_sign_with_expired_certificate() {
    let cert = expired_certificate();
    let service = SigningService::default();

    let result = service
        .sign_with_certificate(TEST_XML, cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(!result.is_success());
    assert!(result.error_message().starts_with("failed to load certificate"));
    assert_eq!(result.error_kind(), Some(ErrorKind::CertificateLoadFailure));
}

#[tokio::test]
async fn test_sign_with_wrong_password() {
    let cert = test_certificate();
    let service = SigningService::default();

    let result = service
        .sign_with_certificate(TEST_XML, cert.path_str(), "wrong-password", ACCESS_KEY)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::CertificateLoadFailure));
}

#[tokio::test]
async fn test_set_default_then_sign_twice() {
    let cert = test_certificate();
    let service = SigningService::default();

    service
        .set_default_certificate(cert.path_str(), cert.password)
        .unwrap();
    // Setting the same pair again is harmless
    service
        .set_default_certificate(cert.path_str(), cert.password)
        .unwrap();

    let first = service.sign(TEST_XML, "first").await;
    let second = service.sign(TEST_XML, "second").await;

    assert!(first.is_success(), "{}", first.error_message());
    assert!(second.is_success(), "{}", second.error_message());
    assert_eq!(second.access_key(), "second");
}

#[tokio::test]
async fn test_set_default_rejects_empty_values() {
    let service = SigningService::default();

    assert!(service.set_default_certificate("", "pw").is_err());
    assert!(service.set_default_certificate("cert.p12", "").is_err());
    assert!(service.default_certificate().is_none());
}

#[tokio::test]
async fn test_default_from_configuration() {
    let cert = test_certificate();
    let config = SignatureConfig::new(cert.path_str(), cert.password);
    let service = SigningService::with_default(SigningAdapter::default(), config);

    assert_eq!(
        service.default_certificate().unwrap().certificate_path,
        cert.path_str()
    );
    let result = service.sign(TEST_XML, ACCESS_KEY).await;
    assert!(result.is_success(), "{}", result.error_message());
}

#[tokio::test]
async fn test_unconfigured_section_leaves_no_default() {
    let service =
        SigningService::with_default(SigningAdapter::default(), SignatureConfig::default());

    assert!(service.default_certificate().is_none());
}

#[tokio::test]
async fn test_engine_failure() {
    let cert = test_certificate();
    let service = SigningService::new(SigningAdapter::new(Arc::new(FailingEngine)));

    let result = service
        .sign_with_certificate(TEST_XML, cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(!result.is_success());
    assert!(result.error_message().starts_with("error in digital signature"));
    assert!(result.error_message().contains("hardware token unavailable"));
    assert_eq!(result.error_kind(), Some(ErrorKind::SigningEngineFailure));
}

#[tokio::test]
async fn test_unsigned_output_fails_post_sign_validation() {
    let cert = test_certificate();
    let service = SigningService::new(SigningAdapter::new(Arc::new(UnsignedEngine)));

    let result = service
        .sign_with_certificate(TEST_XML, cert.path_str(), cert.password, ACCESS_KEY)
        .await;

    assert!(!result.is_success());
    assert_eq!(result.error_message(), "generated signature is not valid");
    assert_eq!(result.error_kind(), Some(ErrorKind::PostSignValidationFailure));
    assert!(result.signed_xml().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signing_while_default_changes() {
    let first = test_certificate();
    let second = test_certificate();
    let service = Arc::new(SigningService::default());
    service
        .set_default_certificate(first.path_str(), first.password)
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.sign(TEST_XML, &format!("key-{i}")).await
        }));
    }
    service
        .set_default_certificate(second.path_str(), second.password)
        .unwrap();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert!(result.is_success(), "{}", result.error_message());
        assert_eq!(result.access_key(), format!("key-{i}"));
    }
    assert_eq!(
        service.default_certificate().unwrap().certificate_path,
        second.path_str()
    );
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let service = SigningService::default();

    let result = service.sign(TEST_XML, ACCESS_KEY).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["errorKind"], "invalidInput");
    assert_eq!(json["accessKey"], ACCESS_KEY);
}

#[test]
fn test_validate_signature_pass_through() {
    let service = SigningService::default();

    assert!(!service.validate_signature("<root/>"));
    assert!(!service.validate_signature(""));
    assert!(service.validate_signature(
        "<root><ds:Signature xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\"><ds:SignatureValue>YWJj</ds:SignatureValue></ds:Signature></root>"
    ));
}
