//! REST client for Gemini (story text) and Imagen (illustrations).
//!
//! Both services share the same endpoint root, authentication header and
//! error envelope, so one client serves both driver traits.
//!
//! # Retries
//!
//! A failed call is classified into a [`GeminiErrorKind`]. Retryable kinds
//! (408, 429, 5xx, connection failures) are retried with exponential backoff
//! and jitter using the error-specific strategy from
//! [`GeminiErrorKind::retry_strategy_params`], capped by `retry.max_retries`.
//! Billing refusals and other client errors fail immediately.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, info, instrument, warn};

use fabula_core::{
    FabulaConfig, GenerateRequest, GenerateResponse, IllustrationConfig, ImageRequest, Output,
    RetryConfig, StoryConfig,
};
use fabula_error::{FabulaResult, GeminiError, GeminiErrorKind};
use fabula_interface::{ImageDriver, StoryDriver};

use super::GeminiResult;
use super::dto::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    OutputOptions, PredictInstance, PredictParameters, PredictRequest, PredictResponse,
};

/// Phrases the service uses when a model requires a billed account.
const BILLING_MARKERS: &[&str] = &["billed users", "billing"];

/// Client for the Generative Language API.
///
/// The API key is passed in explicitly; the client never reads the
/// environment.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    story: StoryConfig,
    illustration: IllustrationConfig,
    retry: RetryConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("story_model", &self.story.model)
            .field("image_model", &self.illustration.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for the models named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fabula_core::FabulaConfig;
    /// use fabula_models::GeminiClient;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GeminiClient::new("my-api-key", &FabulaConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(name = "gemini_client_new", skip_all)]
    pub fn new(api_key: impl Into<String>, config: &FabulaConfig) -> FabulaResult<Self> {
        Self::new_internal(api_key.into(), config).map_err(Into::into)
    }

    fn new_internal(api_key: String, config: &FabulaConfig) -> GeminiResult<Self> {
        if api_key.trim().is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::MissingApiKey));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("fabula/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            story: config.story.clone(),
            illustration: config.illustration.clone(),
            retry: config.retry.clone(),
        })
    }

    /// URL of a model method, e.g. `.../models/gemini-2.5-flash:generateContent`.
    fn endpoint(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// One POST, with the response classified into a Gemini error on failure.
    async fn post_once<B, R>(&self, url: &str, body: &B) -> GeminiResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::new(classify_failure(
                status.as_u16(),
                &error_text,
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ResponseParse(e.to_string())))
    }

    /// POST with retry of transient failures.
    async fn post<B, R>(&self, url: &str, body: &B) -> GeminiResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let first = self.post_once(url, body).await;

        let (initial_ms, max_retries, max_delay_secs) = match &first {
            Ok(_) => return first,
            Err(e) if !self.retry.enabled || !e.kind.is_retryable() => {
                debug!(error = %e, "Not retrying Gemini request");
                return first;
            }
            Err(e) => {
                let (initial_ms, retries, max_delay_secs) = e.kind.retry_strategy_params();
                let retries = retries.min(self.retry.max_retries);
                info!(
                    error = %e,
                    initial_backoff_ms = initial_ms,
                    max_retries = retries,
                    max_delay_secs,
                    "Gemini request failed, will retry with configured strategy"
                );
                (initial_ms, retries, max_delay_secs)
            }
        };

        if max_retries == 0 {
            return first;
        }

        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        Retry::spawn(strategy, move || async move {
            match self.post_once(url, body).await {
                Ok(value) => Ok(value),
                Err(e) if e.kind.is_retryable() => {
                    warn!(error = %e, "Gemini request failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent Gemini error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }

    async fn generate_internal(&self, req: &GenerateRequest) -> GeminiResult<GenerateResponse> {
        let model = req.model().as_deref().unwrap_or(&self.story.model);
        let body = GenerateContentRequest {
            contents: req.turns().iter().map(Content::from).collect(),
            generation_config: GenerationConfig {
                temperature: req.temperature().unwrap_or(self.story.temperature),
                top_k: self.story.top_k,
                top_p: self.story.top_p,
                max_output_tokens: req.max_tokens().unwrap_or(self.story.max_output_tokens),
            },
        };

        let url = self.endpoint(model, "generateContent");
        debug!(url = %url, turns = body.contents.len(), "Sending Gemini generateContent request");

        let response: GenerateContentResponse = self.post(&url, &body).await?;

        let text = response.first_candidate_text().ok_or_else(|| {
            let reason = response.block_reason().unwrap_or("no candidates returned");
            GeminiError::new(GeminiErrorKind::EmptyResponse(reason.to_string()))
        })?;

        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!(finish_reason = reason, chars = text.len(), "Gemini reply received");
        }

        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    async fn generate_images_internal(
        &self,
        req: &ImageRequest,
    ) -> GeminiResult<GenerateResponse> {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: req.prompt().clone(),
            }],
            parameters: PredictParameters {
                sample_count: *req.count(),
                aspect_ratio: req.aspect_ratio().clone(),
                output_options: OutputOptions {
                    mime_type: req.mime_type().clone(),
                },
            },
        };

        let url = self.endpoint(&self.illustration.model, "predict");
        debug!(url = %url, "Sending Imagen predict request");

        let response: PredictResponse = self.post(&url, &body).await?;

        let mut outputs = Vec::with_capacity(response.predictions.len());
        for prediction in response.predictions {
            let Some(encoded) = prediction.bytes_base64_encoded else {
                continue;
            };
            let data = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string())))?;
            outputs.push(Output::Image {
                mime: prediction.mime_type.or_else(|| Some(req.mime_type().clone())),
                data,
            });
        }

        debug!(images = outputs.len(), "Imagen reply received");
        Ok(GenerateResponse { outputs })
    }
}

/// Turn a non-2xx response into an error kind.
///
/// The body is usually `{"error": {"code", "message", "status"}}`; anything
/// else is kept verbatim as the message.
fn classify_failure(status_code: u16, body: &str) -> GeminiErrorKind {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) if !envelope.error.message.contains(&status) => {
                format!("{} ({})", envelope.error.message, status)
            }
            _ => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    };

    let lowered = message.to_lowercase();
    if BILLING_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        GeminiErrorKind::Billing(message)
    } else {
        GeminiErrorKind::HttpError {
            status_code,
            message,
        }
    }
}

#[async_trait]
impl StoryDriver for GeminiClient {
    #[instrument(skip(self, req), fields(model = %self.story.model))]
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse> {
        self.generate_internal(req).await.map_err(Into::into)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.story.model
    }
}

#[async_trait]
impl ImageDriver for GeminiClient {
    #[instrument(skip(self, req), fields(model = %self.illustration.model))]
    async fn generate_images(&self, req: &ImageRequest) -> FabulaResult<GenerateResponse> {
        self.generate_images_internal(req).await.map_err(Into::into)
    }

    fn model_name(&self) -> &str {
        &self.illustration.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_message_is_classified_as_billing() {
        let body = r#"{"error": {"code": 400, "message": "Imagen API is only accessible to billed users at this time.", "status": "INVALID_ARGUMENT"}}"#;
        let kind = classify_failure(400, body);
        assert!(kind.is_billing());
        assert!(kind.to_string().contains("billed users"));
    }

    #[test]
    fn test_other_failures_keep_status_code() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        match classify_failure(503, body) {
            GeminiErrorKind::HttpError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 503);
                assert!(message.contains("overloaded"));
                assert!(message.contains("UNAVAILABLE"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_error_body_is_kept() {
        let kind = classify_failure(502, "  Bad Gateway  ");
        assert_eq!(
            kind,
            GeminiErrorKind::HttpError {
                status_code: 502,
                message: "Bad Gateway".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = GeminiClient::new("   ", &FabulaConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        let client = GeminiClient::new("key", &FabulaConfig::default()).unwrap();
        assert_eq!(
            client.endpoint("models/gemini-2.5-flash", "generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            client.endpoint("imagen-3.0-generate-002", "predict"),
            "https://generativelanguage.googleapis.com/v1beta/models/imagen-3.0-generate-002:predict"
        );
    }
}
