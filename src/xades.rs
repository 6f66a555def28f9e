//! XAdES signing engine boundary
//!
//! The orchestrator drives signing through [`SigningAdapter`], which builds
//! fresh [`SignatureParameters`] per call and hands them to a
//! [`SigningEngine`]. [`XadesEngine`] is the built-in engine; any other
//! XAdES-capable implementation can be plugged in behind the same trait.

pub mod constants;
mod engine;
mod error;
mod params;
pub mod types;

pub use engine::XadesEngine;
pub use error::SignError;
pub use params::{CommitmentType, Packaging, SignatureAlgorithm, SignatureParameters};

use std::sync::Arc;
use tracing::debug;

use crate::certificate::CertificateIdentity;
use crate::xml::Document;

/// A capability that produces an XAdES signature for a document.
///
/// Implementations are CPU-bound and blocking. On failure no partial output
/// is returned.
pub trait SigningEngine: Send + Sync + 'static {
    fn sign(
        &self,
        document: &Document,
        identity: &CertificateIdentity,
        params: &SignatureParameters,
    ) -> Result<Document, SignError>;
}

/// Binds an identity to per-call signature parameters and invokes the engine
#[derive(Clone)]
pub struct SigningAdapter {
    engine: Arc<dyn SigningEngine>,
    algorithm: SignatureAlgorithm,
}

impl SigningAdapter {
    pub fn new(engine: Arc<dyn SigningEngine>) -> Self {
        Self {
            engine,
            algorithm: SignatureAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Parameters for a signature made now
    pub fn parameters(&self) -> SignatureParameters {
        SignatureParameters::new(self.algorithm)
    }

    /// Sign `document` as an enveloped XAdES signature with "proof of origin"
    pub fn sign(
        &self,
        document: &Document,
        identity: &CertificateIdentity,
    ) -> Result<Document, SignError> {
        let params = self.parameters();
        debug!(
            algorithm = ?params.algorithm(),
            signing_time = %params.signing_time_xml(),
            subject = identity.subject(),
            "Invoking signing engine"
        );
        self.engine.sign(document, identity, &params)
    }
}

impl Default for SigningAdapter {
    fn default() -> Self {
        Self::new(Arc::new(XadesEngine))
    }
}

impl std::fmt::Debug for SigningAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningAdapter")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
