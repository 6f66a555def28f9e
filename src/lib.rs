pub mod certificate;
pub mod config;
pub mod crypto;
pub mod signing;
pub mod telemetry;
pub mod validator;
pub mod xades;
pub mod xml;

pub use signing::{ErrorKind, SignatureResult, SigningError, SigningService};
