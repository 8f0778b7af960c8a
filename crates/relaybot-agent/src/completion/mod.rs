//! Completion-service boundary.
//!
//! `CompletionService` is the seam the pipeline talks to; `ResponsesClient`
//! is the HTTP implementation. Whatever shape the service answers with, a
//! successful call always yields text (see [`extract`]). Only transport,
//! authentication, service and deadline failures surface as errors.

pub mod extract;
pub mod responses;

use std::time::Duration;

use async_trait::async_trait;

pub use extract::extract_text;
pub use responses::ResponsesClient;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Service name for logging and error messages.
    fn name(&self) -> &str;

    /// Send `prompt` under `model` and return the generated text.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication rejected ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("no response within {after:?}")]
    Timeout { after: Duration },
}
