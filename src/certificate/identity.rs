use chrono::{DateTime, Utc};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::fmt;
use std::path::{Path, PathBuf};

/// A decoded signing identity: the end-entity certificate and its private key.
pub struct CertificateIdentity {
    pub(super) certificate: X509,
    pub(super) certificate_der: Vec<u8>,
    pub(super) private_key: PKey<Private>,
    pub(super) subject: String,
    pub(super) issuer: String,
    pub(super) serial_number: String,
    pub(super) not_after: DateTime<Utc>,
    pub(super) path: PathBuf,
}

impl CertificateIdentity {
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// DER encoding of the certificate
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    /// Subject distinguished name in RFC 4514 order, e.g. `CN=Signer,O=Org,C=CM`
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer distinguished name in RFC 4514 order, e.g. `CN=Signer,O=Org,C=CM`
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Serial number in decimal notation
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// End of the certificate validity period
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// File the identity was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_expired_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_after < instant
    }
}

impl fmt::Debug for CertificateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateIdentity")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("serial_number", &self.serial_number)
            .field("not_after", &self.not_after)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
