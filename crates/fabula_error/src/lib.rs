//! Error types for the Fabula engine.
//!
//! Every concern gets its own error type, and they all fold into
//! [`FabulaError`].
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use fabula_error::{ConfigError, FabulaResult};
//!
//! fn load() -> FabulaResult<String> {
//!     Err(ConfigError::new("missing [story] section"))?
//! }
//!
//! match load() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod gemini;
mod json;
mod narrative;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{FabulaError, FabulaErrorKind, FabulaResult};
pub use gemini::{GeminiError, GeminiErrorKind, RetryableError};
pub use json::JsonError;
pub use narrative::{NarrativeError, NarrativeErrorKind};
