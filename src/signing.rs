//! Signing orchestrator and its outcome types

mod error;
mod result;
mod service;

pub use error::{ErrorKind, SigningError};
pub use result::SignatureResult;
pub use service::SigningService;
