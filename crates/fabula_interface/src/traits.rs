//! Trait definitions for language-model and image-model backends.

use async_trait::async_trait;
use fabula_core::{GenerateRequest, GenerateResponse, ImageRequest};
use fabula_error::FabulaResult;

/// Backend that continues a conversation transcript with text.
#[async_trait]
pub trait StoryDriver: Send + Sync {
    /// Send the transcript and return the model's reply.
    ///
    /// Transport, authentication and quota failures are errors. Whatever
    /// text the service returns, however malformed, is a success.
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-2.5-flash").
    fn model_name(&self) -> &str;
}

/// Backend that renders images from a prompt.
#[async_trait]
pub trait ImageDriver: Send + Sync {
    /// Generate images; each one is an `Output::Image` in the response.
    ///
    /// Billing or entitlement refusals must be reported with
    /// `GeminiErrorKind::Billing` so callers can tell them apart.
    async fn generate_images(&self, req: &ImageRequest) -> FabulaResult<GenerateResponse>;

    /// Model identifier (e.g., "imagen-3.0-generate-002").
    fn model_name(&self) -> &str;
}
