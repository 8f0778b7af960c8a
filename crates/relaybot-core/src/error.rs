use thiserror::Error;

use crate::store::StoreError;

/// Startup-fatal errors. Anything surfacing as `RelayError` stops the process
/// before the bot connects.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {name} (set {env})")]
    MissingCredential {
        name: &'static str,
        env: &'static str,
    },

    #[error("Config store error: {0}")]
    Store(#[from] StoreError),
}

impl RelayError {
    /// Short error code string used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::MissingCredential { .. } => "MISSING_CREDENTIAL",
            RelayError::Store(_) => "STORE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
