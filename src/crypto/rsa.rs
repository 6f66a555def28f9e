use crate::crypto::HashAlg;
use crate::crypto::errors::{CryptoResult, Error};
use openssl::pkey::{Id, PKey, Private, Public};
use openssl::sign::{Signer, Verifier};
use std::fmt;

/// Represents an RSA PKCS#1 v1.5 signature
#[derive(Clone)]
pub struct RsaSignature {
    key_bits: u32,
    data: Vec<u8>,
}

impl RsaSignature {
    /// Create a new RSA signature made with a key of `key_bits` bits
    pub fn new(key_bits: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key_bits,
            data: data.into(),
        }
    }

    /// Modulus size in bits of the key that produced this signature
    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }

    /// Get the signature data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the signature length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if signature is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for RsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSignature")
            .field("key_bits", &self.key_bits)
            .field("size", &self.len())
            .finish()
    }
}

/// RSA private key wrapper
#[derive(Clone)]
pub struct RsaPrivateKey {
    key: PKey<Private>,
    key_bits: u32,
}

impl RsaPrivateKey {
    /// Wrap a private key decoded elsewhere (e.g. from a PKCS#12 container).
    ///
    /// Any modulus size is accepted; fails only if the key is not an RSA key.
    pub fn from_pkey(key: PKey<Private>) -> CryptoResult<Self> {
        if key.id() != Id::RSA {
            return Err(Error::Invalid(format!(
                "Expected an RSA private key, found key type {:?}",
                key.id()
            )));
        }
        let key_bits = key.bits();
        Ok(Self { key, key_bits })
    }

    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("key_bits", &self.key_bits)
            .finish_non_exhaustive()
    }
}

/// RSA public key wrapper
#[derive(Debug, Clone)]
pub struct RsaPublicKey {
    key: PKey<Public>,
    key_bits: u32,
}

impl RsaPublicKey {
    /// Wrap the public key of a certificate
    pub fn from_pkey(key: PKey<Public>) -> CryptoResult<Self> {
        if key.id() != Id::RSA {
            return Err(Error::Invalid("Expected an RSA public key".into()));
        }
        let key_bits = key.bits();
        Ok(Self { key, key_bits })
    }

    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }
}

/// Sign data using RSA private key (PKCS#1 v1.5)
pub fn sign(
    private_key: &RsaPrivateKey,
    data: impl AsRef<[u8]>,
    hash_alg: HashAlg,
) -> CryptoResult<RsaSignature> {
    let mut signer = Signer::new((&hash_alg).into(), &private_key.key)?;
    let signature_data = signer.sign_oneshot_to_vec(data.as_ref())?;

    Ok(RsaSignature::new(private_key.key_bits(), signature_data))
}

/// Verify RSA signature
pub fn verify(
    public_key: &RsaPublicKey,
    data: impl AsRef<[u8]>,
    signature: &RsaSignature,
    hash_alg: HashAlg,
) -> CryptoResult<bool> {
    if public_key.key_bits() != signature.key_bits() {
        return Err(Error::Invalid(
            "Signature key size does not match key size".to_string(),
        ));
    }

    let mut verifier = Verifier::new((&hash_alg).into(), &public_key.key)?;
    let result = verifier.verify_oneshot(signature.as_bytes(), data.as_ref())?;
    Ok(result)
}
