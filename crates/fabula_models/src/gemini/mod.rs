//! Google Generative Language API client.
//!
//! [`GeminiClient`] speaks the REST API directly:
//! - `models/{model}:generateContent` for story text
//! - `models/{model}:predict` for Imagen illustrations

mod client;
mod dto;

pub use client::GeminiClient;

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, fabula_error::GeminiError>;
