use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::{SignatureResult, SigningError};
use crate::certificate;
use crate::config::SignatureConfig;
use crate::validator;
use crate::xades::{SignError, SigningAdapter};
use crate::xml;

/// Signing orchestrator.
///
/// Every call is independent; the only shared state is the default
/// certificate, swapped as a whole so readers see either the old or the new
/// (path, password) pair.
pub struct SigningService {
    adapter: SigningAdapter,
    default_certificate: RwLock<Option<Arc<SignatureConfig>>>,
}

impl SigningService {
    pub fn new(adapter: SigningAdapter) -> Self {
        Self {
            adapter,
            default_certificate: RwLock::new(None),
        }
    }

    /// Service with a default certificate taken from configuration.
    ///
    /// An unconfigured (empty) section leaves the service without a default.
    pub fn with_default(adapter: SigningAdapter, config: SignatureConfig) -> Self {
        let default = config.is_configured().then(|| Arc::new(config));
        Self {
            adapter,
            default_certificate: RwLock::new(default),
        }
    }

    /// Replace the default certificate. The certificate is not opened here;
    /// problems surface on the next signing call that uses it.
    pub fn set_default_certificate(
        &self,
        certificate_path: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), SigningError> {
        let certificate_path = certificate_path.into();
        let password = password.into();
        if certificate_path.is_empty() {
            return Err(SigningError::InvalidInput("certificate path is empty".into()));
        }
        if password.is_empty() {
            return Err(SigningError::InvalidInput(
                "certificate password is empty".into(),
            ));
        }

        let config = Arc::new(SignatureConfig::new(certificate_path, password));
        info!("Default certificate set to {}", config.certificate_path);
        *self
            .default_certificate
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(config);
        Ok(())
    }

    /// Snapshot of the current default certificate
    pub fn default_certificate(&self) -> Option<Arc<SignatureConfig>> {
        self.default_certificate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sign with the default certificate
    #[instrument(skip(self, xml_content))]
    pub async fn sign(&self, xml_content: &str, access_key: &str) -> SignatureResult {
        self.run(xml_content, None, access_key).await
    }

    /// Sign with an explicit certificate, ignoring the default
    #[instrument(skip(self, xml_content, password))]
    pub async fn sign_with_certificate(
        &self,
        xml_content: &str,
        certificate_path: &str,
        password: &str,
        access_key: &str,
    ) -> SignatureResult {
        let explicit = Arc::new(SignatureConfig::new(certificate_path, password));
        self.run(xml_content, Some(explicit), access_key).await
    }

    /// Structural check of an externally obtained signed document
    pub fn validate_signature(&self, signed_xml: &str) -> bool {
        validator::validate(signed_xml)
    }

    async fn run(
        &self,
        xml_content: &str,
        explicit: Option<Arc<SignatureConfig>>,
        access_key: &str,
    ) -> SignatureResult {
        let started = Instant::now();
        info!("Starting digital signature");

        let signed_xml = match self.try_sign(xml_content, explicit).await {
            Ok(signed_xml) => signed_xml,
            Err(e) => {
                warn!(kind = ?e.kind(), "Digital signature failed: {e}");
                return SignatureResult::failure(&e, access_key, elapsed_ms(started));
            }
        };

        let result = SignatureResult::success(signed_xml, access_key, elapsed_ms(started));

        // The engine's output is re-checked before it is handed out
        if !validator::validate(result.signed_xml()) {
            let e = SigningError::PostSignValidation;
            warn!(kind = ?e.kind(), "Digital signature failed: {e}");
            return SignatureResult::failure(&e, access_key, result.processing_time_ms());
        }

        info!(
            "Digital signature completed in {} ms",
            result.processing_time_ms()
        );
        result
    }

    async fn try_sign(
        &self,
        xml_content: &str,
        explicit: Option<Arc<SignatureConfig>>,
    ) -> Result<String, SigningError> {
        if xml_content.trim().is_empty() {
            return Err(SigningError::InvalidInput("XML content is empty".into()));
        }

        let credentials = match explicit {
            Some(credentials) => {
                if credentials.certificate_path.is_empty() {
                    return Err(SigningError::InvalidInput(
                        "certificate path is empty".into(),
                    ));
                }
                credentials
            }
            None => self
                .default_certificate()
                .ok_or(SigningError::DefaultCertificateNotConfigured)?,
        };

        let document = xml::parse(xml_content)?;
        debug!(root = document.root().name(), "XML preflight passed");

        let path = PathBuf::from(&credentials.certificate_path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(SigningError::CertificateNotFound(path));
        }

        let adapter = self.adapter.clone();
        let password: SecretString = credentials.certificate_password.clone();
        let signed = tokio::task::spawn_blocking(move || {
            let identity = certificate::load(&path, password.expose_secret())?;
            let signed = adapter.sign(&document, &identity)?;
            Ok::<_, SigningError>(signed)
        })
        .await
        .map_err(|e| SigningError::SigningEngine(SignError::Task(e.to_string())))??;

        Ok(signed.into_string())
    }
}

impl Default for SigningService {
    fn default() -> Self {
        Self::new(SigningAdapter::default())
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
