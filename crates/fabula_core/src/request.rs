//! Request and response types for driver calls.

use crate::{Output, Turn};
use derive_builder::Builder;
use derive_getters::Getters;
use fabula_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// Text generation request carrying the full transcript.
///
/// The last turn is the prompt being sent; earlier turns are history.
/// Unset sampling fields fall back to the driver's configuration.
///
/// # Examples
///
/// ```
/// use fabula_core::{GenerateRequest, Turn};
///
/// let request = GenerateRequest::builder()
///     .turns(vec![Turn::user("Hello!")])
///     .temperature(Some(0.7))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.turns().len(), 1);
/// assert_eq!(*request.max_tokens(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Builder, Getters)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// Transcript, oldest first
    turns: Vec<Turn>,
    /// Maximum number of tokens to generate
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default)]
    temperature: Option<f32>,
    /// Model identifier to use
    #[builder(default)]
    model: Option<String>,
}

impl GenerateRequest {
    /// Creates a new builder for `GenerateRequest`.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// The prompt being sent, if any.
    pub fn prompt(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

/// Image generation request.
///
/// # Examples
///
/// ```
/// use fabula_core::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("A lighthouse at dusk")
///     .mime_type("image/jpeg")
///     .aspect_ratio("16:9")
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Full prompt, art direction included
    prompt: String,
    /// Number of images to generate
    #[builder(default = "1")]
    count: u32,
    /// Requested output MIME type
    mime_type: String,
    /// Requested aspect ratio, e.g. "16:9"
    aspect_ratio: String,
}

impl ImageRequest {
    /// Creates a new builder for `ImageRequest`.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use fabula_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("You wake ".into()), Output::Text("in a cave.".into())],
/// };
///
/// assert_eq!(response.text(), "You wake in a cave.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenated text of all text outputs.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Image outputs as `(mime, bytes)` pairs, in order.
    pub fn images(&self) -> Vec<(Option<&str>, &[u8])> {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Image { mime, data } => Some((mime.as_deref(), data.as_slice())),
                _ => None,
            })
            .collect()
    }
}

impl From<GenerateRequestBuilderError> for BuilderError {
    #[track_caller]
    fn from(err: GenerateRequestBuilderError) -> Self {
        match err {
            GenerateRequestBuilderError::UninitializedField(field) => {
                BuilderError::new(BuilderErrorKind::MissingField(field.to_string()))
            }
            GenerateRequestBuilderError::ValidationError(msg) => {
                BuilderError::new(BuilderErrorKind::ValidationFailed(msg))
            }
        }
    }
}

impl From<ImageRequestBuilderError> for BuilderError {
    #[track_caller]
    fn from(err: ImageRequestBuilderError) -> Self {
        match err {
            ImageRequestBuilderError::UninitializedField(field) => {
                BuilderError::new(BuilderErrorKind::MissingField(field.to_string()))
            }
            ImageRequestBuilderError::ValidationError(msg) => {
                BuilderError::new(BuilderErrorKind::ValidationFailed(msg))
            }
        }
    }
}
