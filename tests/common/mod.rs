#![allow(dead_code)]

use openssl::asn1::{Asn1Integer, Asn1Time};
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{KeyUsage, SubjectAlternativeName};
use openssl::x509::{X509, X509Builder, X509NameBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEST_CERT_FILE: &str = "test-cert.p12";
pub const TEST_PASSWORD: &str = "test-password";
pub const TEST_XML: &str = "<test>content</test>";

const DAY_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_KEY_BITS: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Current,
    Expired,
}

/// A PKCS#12 file living in its own temporary directory
pub struct TestCertificate {
    pub dir: TempDir,
    pub path: PathBuf,
    pub password: &'static str,
    pub certificate: X509,
}

impl TestCertificate {
    pub fn path_str(&self) -> &str {
        self.path.to_str().unwrap()
    }
}

/// Valid, unexpired `test-cert.p12` protected by `test-password`
pub fn test_certificate() -> TestCertificate {
    build(Validity::Current, DEFAULT_KEY_BITS, true)
}

pub fn expired_certificate() -> TestCertificate {
    build(Validity::Expired, DEFAULT_KEY_BITS, true)
}

/// Valid certificate whose RSA key has `key_bits` bits
pub fn certificate_with_key_size(key_bits: u32) -> TestCertificate {
    build(Validity::Current, key_bits, true)
}

/// Container holding only the certificate, no private key
pub fn certificate_without_key() -> TestCertificate {
    build(Validity::Current, DEFAULT_KEY_BITS, false)
}

fn build(validity: Validity, key_bits: u32, with_key: bool) -> TestCertificate {
    let dir = TempDir::new().unwrap();
    let (certificate, key) = generate_certificate(validity, key_bits);
    let path = write_pkcs12(
        dir.path(),
        TEST_CERT_FILE,
        TEST_PASSWORD,
        &certificate,
        with_key.then_some(&key),
    );

    TestCertificate {
        dir,
        path,
        password: TEST_PASSWORD,
        certificate,
    }
}

pub fn write_pkcs12(
    dir: &Path,
    file_name: &str,
    password: &str,
    certificate: &X509,
    key: Option<&PKey<Private>>,
) -> PathBuf {
    let mut builder = Pkcs12::builder();
    builder.name("xades-signer test").cert(certificate);
    if let Some(key) = key {
        builder.pkey(key);
    }
    let pkcs12 = builder.build2(password).unwrap();

    let path = dir.join(file_name);
    fs::write(&path, pkcs12.to_der().unwrap()).unwrap();
    path
}

/// Self-signed RSA signing certificate
pub fn generate_certificate(validity: Validity, key_bits: u32) -> (X509, PKey<Private>) {
    let rsa = Rsa::generate(key_bits).unwrap();
    let key_pair = PKey::from_rsa(rsa).unwrap();

    let mut cert_builder = X509Builder::new().unwrap();
    cert_builder.set_version(2).unwrap();
    cert_builder
        .set_serial_number(&generate_serial_number())
        .unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("C", "CM").unwrap();
    name.append_entry_by_text("O", "Test Organization").unwrap();
    name.append_entry_by_text("CN", "Test Signer").unwrap();
    let name = name.build();
    cert_builder.set_subject_name(&name).unwrap();
    cert_builder.set_issuer_name(&name).unwrap();
    cert_builder.set_pubkey(&key_pair).unwrap();

    let now = chrono::Utc::now().timestamp();
    let (not_before, not_after) = match validity {
        Validity::Current => (now - DAY_SECONDS, now + 365 * DAY_SECONDS),
        Validity::Expired => (now - 30 * DAY_SECONDS, now - DAY_SECONDS),
    };
    cert_builder
        .set_not_before(&Asn1Time::from_unix(not_before).unwrap())
        .unwrap();
    cert_builder
        .set_not_after(&Asn1Time::from_unix(not_after).unwrap())
        .unwrap();

    cert_builder
        .append_extension(
            KeyUsage::new()
                .critical()
                .digital_signature()
                .non_repudiation()
                .build()
                .unwrap(),
        )
        .unwrap();

    // Keeps key-less containers above the 1 KiB lower size bound
    let mut san = SubjectAlternativeName::new();
    for i in 0..40 {
        san.dns(&format!("signer-{i}.example.test"));
    }
    let san = san
        .build(&cert_builder.x509v3_context(None, None))
        .unwrap();
    cert_builder.append_extension(san).unwrap();

    cert_builder
        .sign(&key_pair, MessageDigest::sha256())
        .unwrap();

    (cert_builder.build(), key_pair)
}

fn generate_serial_number() -> Asn1Integer {
    let mut serial = BigNum::new().unwrap();
    serial.rand(128, MsbOption::MAYBE_ZERO, false).unwrap();
    serial.to_asn1_integer().unwrap()
}

/// Text between the end of the first `open` tag and the next `close`
pub fn element_text<'a>(xml: &'a str, open: &str, close: &str) -> &'a str {
    let start = xml.find(open).unwrap();
    let content_start = start + xml[start..].find('>').unwrap() + 1;
    let end = content_start + xml[content_start..].find(close).unwrap();
    &xml[content_start..end]
}
