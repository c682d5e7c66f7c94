//! Generative model client interface.
//!
//! The orchestrator only sees [`ModelClient`]: one prompt in, raw text out.
//! Concrete backends live in submodules; tests substitute fakes.

pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiConfig};

/// Failures of a single model invocation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Network, authentication, quota, or provider-side failure.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("model call timed out after {after:?}")]
    Timeout { after: Duration },
}

/// A generative text backend.
///
/// Implementations make exactly one outbound call per [`generate`] and do
/// not retry. The trait is object-safe so it can be shared as
/// `Arc<dyn ModelClient>`.
///
/// [`generate`]: ModelClient::generate
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable backend name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ModelClient) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ModelClient for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            Ok(prompt.to_string())
        }
    }

    #[tokio::test]
    async fn model_client_is_object_safe() {
        let model: Box<dyn ModelClient> = Box::new(EchoModel);
        assert_eq!(model.name(), "echo");
        assert_eq!(model.generate("hi").await.unwrap(), "hi");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ModelError::Unavailable("HTTP 503".to_string()).to_string(),
            "model unavailable: HTTP 503"
        );
        assert_eq!(
            ModelError::Timeout {
                after: Duration::from_secs(30)
            }
            .to_string(),
            "model call timed out after 30s"
        );
    }
}
