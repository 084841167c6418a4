//! Layered TOML configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`fabula.toml` shipped with the crate)
//! 2. `~/.config/fabula/fabula.toml`
//! 3. `./fabula.toml`

use config::{Config, File, FileFormat};
use fabula_error::{ConfigError, FabulaError, FabulaResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../fabula.toml");

/// Endpoint settings shared by both services.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Root of the Generative Language REST API
    pub base_url: String,
}

/// Story (language model) settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoryConfig {
    /// Model used for scene generation
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Output token cap per reply
    pub max_output_tokens: u32,
}

/// Illustration (image model) settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IllustrationConfig {
    /// Model used for scene illustrations
    pub model: String,
    /// Requested image MIME type
    pub mime_type: String,
    /// Requested aspect ratio
    pub aspect_ratio: String,
    /// Prefix placed before the scene description in image prompts
    pub art_direction: String,
    /// Host serving seeded placeholder images
    pub placeholder_base_url: String,
    /// Discard illustrations belonging to superseded scenes
    #[serde(default)]
    pub discard_stale: bool,
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Theme used when the player leaves it blank
    pub default_theme: String,
    /// Deadline for a single service call
    pub request_timeout_secs: u64,
}

impl SessionConfig {
    /// Deadline for a single service call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Retry settings for transient service errors.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retry retryable errors at all
    pub enabled: bool,
    /// Upper bound on retry attempts, whatever the error-specific strategy says
    pub max_retries: usize,
}

/// Top-level Fabula configuration.
///
/// # Example
///
/// ```no_run
/// use fabula_core::FabulaConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FabulaConfig::load()?;
/// println!("Story model: {}", config.story.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FabulaConfig {
    /// Endpoint settings
    pub api: ApiConfig,
    /// Language model settings
    pub story: StoryConfig,
    /// Image model settings
    pub illustration: IllustrationConfig,
    /// Session settings
    pub session: SessionConfig,
    /// Retry settings
    pub retry: RetryConfig,
}

impl Default for FabulaConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            },
            story: StoryConfig {
                model: "gemini-2.5-flash".to_string(),
                temperature: 0.9,
                top_k: 1,
                top_p: 1.0,
                max_output_tokens: 2048,
            },
            illustration: IllustrationConfig {
                model: "imagen-3.0-generate-002".to_string(),
                mime_type: "image/jpeg".to_string(),
                aspect_ratio: "16:9".to_string(),
                art_direction:
                    "Epic fantasy digital art, cinematic lighting, high detail, masterpiece. Scene: "
                        .to_string(),
                placeholder_base_url: "https://picsum.photos".to_string(),
                discard_stale: false,
            },
            session: SessionConfig {
                default_theme: "a classic high fantasy quest".to_string(),
                request_timeout_secs: 60,
            },
            retry: RetryConfig {
                enabled: true,
                max_retries: 2,
            },
        }
    }
}

impl FabulaConfig {
    /// Parse the bundled defaults only, ignoring user files.
    pub fn bundled() -> FabulaResult<Self> {
        Self::finish(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Parse configuration from a TOML string, layered over the bundled defaults.
    pub fn from_toml_str(toml: &str) -> FabulaResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder)
    }

    /// Load configuration from a specific file, layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> FabulaResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped when absent.
    #[instrument]
    pub fn load() -> FabulaResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/fabula/fabula.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("fabula").required(false));

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> FabulaResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                FabulaError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                FabulaError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no service call could work with.
    pub fn validate(&self) -> FabulaResult<()> {
        if self.story.model.trim().is_empty() {
            return Err(ConfigError::new("story.model must not be empty").into());
        }
        if self.illustration.model.trim().is_empty() {
            return Err(ConfigError::new("illustration.model must not be empty").into());
        }
        if !(0.0..=2.0).contains(&self.story.temperature) {
            return Err(ConfigError::new(format!(
                "story.temperature must be in [0.0, 2.0], got {}",
                self.story.temperature
            ))
            .into());
        }
        if self.session.request_timeout_secs == 0 {
            return Err(ConfigError::new("session.request_timeout_secs must be positive").into());
        }
        Ok(())
    }
}
