//! LLM provider integrations for Fabula.
//!
//! Currently one provider: Google's Generative Language API, which serves
//! both the Gemini story model and the Imagen illustration model.
//!
//! # Example
//!
//! ```no_run
//! use fabula_core::{FabulaConfig, GenerateRequest, Turn};
//! use fabula_interface::StoryDriver;
//! use fabula_models::GeminiClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FabulaConfig::load()?;
//! let client = GeminiClient::new(std::env::var("GEMINI_API_KEY")?, &config)?;
//! let request = GenerateRequest::builder()
//!     .turns(vec![Turn::user("Describe a tavern.")])
//!     .build()?;
//! let response = client.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;

pub use gemini::{GeminiClient, GeminiResult};
