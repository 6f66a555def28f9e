use chrono::{DateTime, Utc};
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::x509::X509NameRef;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{CertificateIdentity, LoadError};

/// Smallest accepted certificate file (1 KiB)
pub const MIN_CERTIFICATE_SIZE: u64 = 1024;
/// Largest accepted certificate file (10 MiB)
pub const MAX_CERTIFICATE_SIZE: u64 = 10 * 1024 * 1024;

/// Check that `path` is a readable regular file within the accepted size range.
///
/// Returns the file size in bytes.
pub fn check_file(path: impl AsRef<Path>) -> Result<u64, LoadError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
    if !metadata.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let size = metadata.len();
    if !(MIN_CERTIFICATE_SIZE..=MAX_CERTIFICATE_SIZE).contains(&size) {
        return Err(LoadError::SizeOutOfBounds {
            size,
            min: MIN_CERTIFICATE_SIZE,
            max: MAX_CERTIFICATE_SIZE,
        });
    }
    Ok(size)
}

/// Load a signing identity from a PKCS#12/PFX file.
///
/// Performs blocking file I/O and key decoding; async callers should run it
/// on a blocking thread.
pub fn load(path: impl AsRef<Path>, password: &str) -> Result<CertificateIdentity, LoadError> {
    let path = path.as_ref();
    debug!("Loading certificate from {}", path.display());

    let size = check_file(path)?;
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    debug!("Read {size} bytes of PKCS#12 data");

    let parsed = Pkcs12::from_der(&bytes)
        .and_then(|pkcs12| pkcs12.parse2(password))
        .map_err(|e| {
            warn!("Failed to decode PKCS#12 container {}: {e}", path.display());
            LoadError::DecodeFailure(e.to_string())
        })?;

    let certificate = parsed
        .cert
        .ok_or_else(|| LoadError::DecodeFailure("container holds no certificate".into()))?;
    let certificate_der = certificate
        .to_der()
        .map_err(|e| LoadError::DecodeFailure(e.to_string()))?;

    let (_, x509) = x509_parser::parse_x509_certificate(&certificate_der)
        .map_err(|e| LoadError::DecodeFailure(format!("invalid X.509 certificate: {e}")))?;
    let not_after = DateTime::<Utc>::from_timestamp(x509.validity().not_after.timestamp(), 0)
        .ok_or_else(|| LoadError::DecodeFailure("certificate end date out of range".into()))?;

    if not_after < Utc::now() {
        warn!("Certificate {} expired on {not_after}", path.display());
        return Err(LoadError::Expired(not_after));
    }

    let private_key = parsed.pkey.ok_or(LoadError::MissingPrivateKey)?;
    let public_key = certificate
        .public_key()
        .map_err(|e| LoadError::DecodeFailure(e.to_string()))?;
    if !public_key.public_eq(&private_key) {
        return Err(LoadError::DecodeFailure(
            "private key does not match the certificate".into(),
        ));
    }

    let serial_number = certificate
        .serial_number()
        .to_bn()
        .and_then(|bn| bn.to_dec_str())
        .map(|dec| dec.to_string())
        .map_err(|e| LoadError::DecodeFailure(e.to_string()))?;

    let identity = CertificateIdentity {
        subject: distinguished_name(certificate.subject_name())?,
        issuer: distinguished_name(certificate.issuer_name())?,
        serial_number,
        not_after,
        path: path.to_path_buf(),
        certificate,
        certificate_der,
        private_key,
    };

    info!(
        "Loaded certificate subject={} serial={} valid until {}",
        identity.subject, identity.serial_number, identity.not_after
    );
    Ok(identity)
}

/// Render a name as an RFC 4514 string: most specific RDN first, joined by `,`.
fn distinguished_name(name: &X509NameRef) -> Result<String, LoadError> {
    let mut rdns = Vec::new();
    for entry in name.entries() {
        let object = entry.object();
        let attribute_type = match object.nid().short_name() {
            Ok(short_name) if object.nid() != Nid::UNDEF => short_name.to_owned(),
            _ => object.to_string(),
        };
        let value = entry
            .data()
            .as_utf8()
            .map_err(|e| LoadError::DecodeFailure(format!("invalid name attribute: {e}")))?;
        rdns.push(format!("{attribute_type}={}", escape_dn_value(&value)));
    }
    rdns.reverse();
    Ok(rdns.join(","))
}

fn escape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, ch) in value.chars().enumerate() {
        let special = matches!(ch, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (i == 0 && matches!(ch, ' ' | '#'))
            || (i == last && ch == ' ');
        if special {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn io_error(path: &Path, err: std::io::Error) -> LoadError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            LoadError::NotFound(path.to_path_buf())
        }
        _ => LoadError::Io(err),
    }
}
