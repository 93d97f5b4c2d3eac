//! Model fallback: rotate through the model list on rate limits.

use async_trait::async_trait;

use crate::error::{FallbackError, GeminiError};
use crate::gemini::client::{GeminiClient, GenerationRequest};

/// One generation attempt against a named model.
///
/// Implemented by [`GeminiClient`] for real calls and by scripted fakes in
/// tests.
#[async_trait]
pub trait GenerateBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, GeminiError>;
}

#[async_trait]
impl GenerateBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, GeminiError> {
        GeminiClient::generate(self, model, request).await
    }
}

/// Try each model in order until one succeeds.
///
/// A single linear pass: a rate-limited model is skipped and never retried
/// within this invocation, and there is no backoff delay. Any non-rate-limit
/// error aborts immediately — a bad credential won't get better on a
/// different model. Exhausting the list yields
/// [`FallbackError::AllModelsExhausted`] naming every model attempted.
pub async fn generate_with_fallback<B: GenerateBackend + ?Sized>(
    backend: &B,
    models: &[String],
    request: &GenerationRequest,
) -> Result<String, FallbackError> {
    let mut attempted = Vec::with_capacity(models.len());

    for model in models {
        match backend.generate(model, request).await {
            Ok(text) => {
                if !attempted.is_empty() {
                    tracing::debug!(model = %model, skipped = attempted.len(), "fallback model succeeded");
                }
                return Ok(text);
            }
            Err(err) if err.is_rate_limited() => {
                tracing::warn!(model = %model, error = %err, "model rate limited, trying next");
                attempted.push(model.clone());
            }
            Err(err) => return Err(FallbackError::Generation(err)),
        }
    }

    Err(FallbackError::AllModelsExhausted { attempted })
}
