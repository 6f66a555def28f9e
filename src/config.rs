use std::collections::HashMap;

use config::{Config as ConfigLib, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::certificate::{self, LoadError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub signature: SignatureConfig,
}

/// Certificate used when a signing call does not bring its own.
///
/// Either both fields are empty (no default) or both are set.
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureConfig {
    #[serde(default)]
    pub certificate_path: String,
    #[serde(default = "empty_secret")]
    pub certificate_password: SecretString,
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureConfigError {
    #[error("{0} is not set; certificate path and password must be configured together")]
    Incomplete(&'static str),

    #[error("Configured certificate is not usable: {0}")]
    Certificate(#[from] LoadError),
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl SignatureConfig {
    pub fn new(certificate_path: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            certificate_path: certificate_path.into(),
            certificate_password: SecretString::from(password.into()),
        }
    }

    /// `true` when both path and password are set
    pub fn is_configured(&self) -> bool {
        !self.certificate_path.is_empty()
            && !self.certificate_password.expose_secret().is_empty()
    }

    /// Check the configuration, opening the certificate if one is configured.
    pub fn validate(&self) -> Result<(), SignatureConfigError> {
        let password = self.certificate_password.expose_secret();
        match (self.certificate_path.is_empty(), password.is_empty()) {
            (true, true) => Ok(()),
            (true, false) => Err(SignatureConfigError::Incomplete("certificate_path")),
            (false, true) => Err(SignatureConfigError::Incomplete("certificate_password")),
            (false, false) => {
                certificate::load(&self.certificate_path, password)?;
                Ok(())
            }
        }
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            certificate_path: String::new(),
            certificate_password: empty_secret(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("signature.certificate_path", "")?
            .set_default("signature.certificate_password", "")?
            .add_source(File::with_name("config/settings").required(false));

        // Explicit overrides keep tests independent of the process environment
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // e.g. APP_SIGNATURE__CERTIFICATE_PATH
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }
}
