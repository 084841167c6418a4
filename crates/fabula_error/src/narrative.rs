//! Narrative session error types.

/// Specific error conditions for adventure sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NarrativeErrorKind {
    /// The opening scene could not be obtained
    #[display("Failed to start adventure: {}", _0)]
    StartFailed(String),
    /// A scene request exceeded its deadline or otherwise never completed
    #[display("Scene request failed: {}", _0)]
    RequestFailed(String),
    /// A choice was made before any adventure started
    #[display("No adventure in progress")]
    InactiveSession,
}

/// Error type for adventure session operations.
///
/// # Examples
///
/// ```
/// use fabula_error::{NarrativeError, NarrativeErrorKind};
///
/// let err = NarrativeError::new(NarrativeErrorKind::InactiveSession);
/// assert!(format!("{}", err).contains("No adventure"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narrative Error: {} at line {} in {}", kind, line, file)]
pub struct NarrativeError {
    /// The specific error condition
    pub kind: NarrativeErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl NarrativeError {
    /// Create a new NarrativeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrativeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
