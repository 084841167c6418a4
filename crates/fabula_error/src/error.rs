//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, GeminiError, JsonError, NarrativeError};

/// Every error condition the engine can report.
///
/// # Examples
///
/// ```
/// use fabula_error::{FabulaError, JsonError};
///
/// let json_err = JsonError::new("unexpected end of input");
/// let err: FabulaError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FabulaErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Gemini / Imagen service error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Adventure session error
    #[from(NarrativeError)]
    Narrative(NarrativeError),
}

/// Fabula error with kind discrimination.
///
/// # Examples
///
/// ```
/// use fabula_error::{ConfigError, FabulaResult};
///
/// fn might_fail() -> FabulaResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Fabula Error: {}", _0)]
pub struct FabulaError(Box<FabulaErrorKind>);

impl FabulaError {
    /// Create a new error from a kind.
    pub fn new(kind: FabulaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FabulaErrorKind {
        &self.0
    }

    /// Condensed message for display to players, without source locations.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_error::{FabulaError, NarrativeError, NarrativeErrorKind};
    ///
    /// let err: FabulaError = NarrativeError::new(NarrativeErrorKind::InactiveSession).into();
    /// assert_eq!(err.user_message(), "No adventure in progress");
    /// ```
    pub fn user_message(&self) -> String {
        match self.kind() {
            FabulaErrorKind::Json(e) => e.message.clone(),
            FabulaErrorKind::Config(e) => e.message.clone(),
            FabulaErrorKind::Builder(e) => e.kind().to_string(),
            FabulaErrorKind::Gemini(e) => e.kind.to_string(),
            FabulaErrorKind::Narrative(e) => e.kind.to_string(),
        }
    }

    /// The underlying Gemini error, if this error came from the service.
    pub fn as_gemini(&self) -> Option<&GeminiError> {
        match self.kind() {
            FabulaErrorKind::Gemini(e) => Some(e),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to FabulaErrorKind
impl<T> From<T> for FabulaError
where
    T: Into<FabulaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Fabula operations.
pub type FabulaResult<T> = std::result::Result<T, FabulaError>;
