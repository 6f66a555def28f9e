use chrono::{DateTime, SecondsFormat, Utc};

use super::constants::*;
use crate::crypto::HashAlg;

/// Signature/digest algorithm pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-1 digests
    #[default]
    RsaSha1,
    /// RSA PKCS#1 v1.5 with SHA-256 digests
    RsaSha256,
}

impl SignatureAlgorithm {
    pub fn signature_uri(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaSha1 => RSA_SHA1_ALGORITHM,
            SignatureAlgorithm::RsaSha256 => RSA_SHA256_ALGORITHM,
        }
    }

    pub fn digest_uri(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaSha1 => SHA1_DIGEST_ALGORITHM,
            SignatureAlgorithm::RsaSha256 => SHA256_DIGEST_ALGORITHM,
        }
    }

    /// Hash used for both reference digests and the signature itself
    pub fn hash_alg(&self) -> HashAlg {
        match self {
            SignatureAlgorithm::RsaSha1 => HashAlg::Sha1,
            SignatureAlgorithm::RsaSha256 => HashAlg::Sha256,
        }
    }
}

/// Where the signature lives relative to the signed data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Packaging {
    /// Signature element inserted as the last child of the signed document's root
    #[default]
    Enveloped,
}

/// Commitment asserted by the signer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentType {
    ProofOfOrigin,
}

impl CommitmentType {
    pub fn identifier(&self) -> &'static str {
        match self {
            CommitmentType::ProofOfOrigin => PROOF_OF_ORIGIN_URI,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommitmentType::ProofOfOrigin => PROOF_OF_ORIGIN_DESCRIPTION,
        }
    }
}

/// Parameters of a single signing operation. Built fresh for every call.
#[derive(Debug, Clone)]
pub struct SignatureParameters {
    algorithm: SignatureAlgorithm,
    packaging: Packaging,
    signing_time: DateTime<Utc>,
    commitments: Vec<CommitmentType>,
}

impl SignatureParameters {
    /// Enveloped signature with a single "proof of origin" commitment, signed now
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            packaging: Packaging::Enveloped,
            signing_time: Utc::now(),
            commitments: vec![CommitmentType::ProofOfOrigin],
        }
    }

    pub fn with_signing_time(mut self, signing_time: DateTime<Utc>) -> Self {
        self.signing_time = signing_time;
        self
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn packaging(&self) -> Packaging {
        self.packaging
    }

    pub fn signing_time(&self) -> DateTime<Utc> {
        self.signing_time
    }

    /// Signing time as an `xsd:dateTime` in UTC
    pub fn signing_time_xml(&self) -> String {
        self.signing_time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn commitments(&self) -> &[CommitmentType] {
        &self.commitments
    }

    pub fn canonicalization_uri(&self) -> &'static str {
        EXCLUSIVE_C14N_ALGORITHM
    }
}

impl Default for SignatureParameters {
    fn default() -> Self {
        Self::new(SignatureAlgorithm::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_parameters() {
        let params = SignatureParameters::default();

        assert_eq!(params.algorithm(), SignatureAlgorithm::RsaSha1);
        assert_eq!(params.packaging(), Packaging::Enveloped);
        assert_eq!(params.commitments(), [CommitmentType::ProofOfOrigin]);
        assert_eq!(params.algorithm().signature_uri(), RSA_SHA1_ALGORITHM);
        assert_eq!(params.algorithm().digest_uri(), SHA1_DIGEST_ALGORITHM);
    }

    #[test]
    fn test_signing_time_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let params = SignatureParameters::default().with_signing_time(time);

        assert_eq!(params.signing_time_xml(), "2024-03-01T12:30:05Z");
    }
}
