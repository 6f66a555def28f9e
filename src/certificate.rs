//! Loading of PKCS#12/PFX signing identities
//!
//! A [`CertificateIdentity`] is decoded per signing call from a (path, password)
//! pair. Nothing is cached here; callers that want to reuse an identity keep it
//! themselves.

mod error;
mod identity;
mod loader;

pub use error::LoadError;
pub use identity::CertificateIdentity;
pub use loader::{MAX_CERTIFICATE_SIZE, MIN_CERTIFICATE_SIZE, check_file, load};
