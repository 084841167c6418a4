//! Conversation session with the story model.

use std::sync::Arc;
use std::time::Duration;

use fabula_core::{FabulaConfig, GenerateRequest, Scene, Turn};
use fabula_error::{BuilderError, FabulaResult, NarrativeError, NarrativeErrorKind};
use fabula_interface::StoryDriver;
use tracing::{debug, info, instrument};

use crate::normalizer::{NormalizedScene, normalize_reply};
use crate::prompt::{continuation_prompt, opening_prompt, with_format_instructions};

/// One linear adventure: the transcript plus the driver that extends it.
///
/// The transcript only grows, one user/model exchange per successful
/// [`start`](Self::start) or [`advance`](Self::advance). A failed request
/// leaves it untouched.
pub struct ConversationSession {
    driver: Arc<dyn StoryDriver>,
    default_theme: String,
    timeout: Duration,
    transcript: Vec<Turn>,
    active: bool,
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("provider", &self.driver.provider_name())
            .field("model", &self.driver.model_name())
            .field("turns", &self.transcript.len())
            .field("active", &self.active)
            .finish()
    }
}

impl ConversationSession {
    /// Create an inactive session.
    pub fn new(driver: Arc<dyn StoryDriver>, config: &FabulaConfig) -> Self {
        Self {
            driver,
            default_theme: config.session.default_theme.clone(),
            timeout: config.session.request_timeout(),
            transcript: Vec::new(),
            active: false,
        }
    }

    /// Whether an opening scene has been obtained.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turns exchanged so far, oldest first.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Discard the transcript and deactivate.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.active = false;
    }

    /// Begin a new adventure and return its opening scene.
    ///
    /// A blank theme falls back to the configured default. Any previous
    /// transcript is discarded first.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`NarrativeErrorKind::StartFailed`]
    /// carrying a readable message; the session stays inactive.
    #[instrument(skip(self), fields(provider = self.driver.provider_name()))]
    pub async fn start(&mut self, theme: &str) -> FabulaResult<Scene> {
        self.reset();

        let theme = if theme.trim().is_empty() {
            self.default_theme.clone()
        } else {
            theme.to_string()
        };

        let normalized = self.exchange(opening_prompt(&theme)).await.map_err(|e| {
            NarrativeError::new(NarrativeErrorKind::StartFailed(e.user_message()))
        })?;

        self.active = true;
        info!(theme = %theme, source = %normalized.source, "Adventure started");
        Ok(normalized.into_scene())
    }

    /// Continue the story with the player's choice.
    ///
    /// Returns `Ok(None)` without contacting the service when no adventure
    /// is in progress.
    ///
    /// # Errors
    ///
    /// Service failures and timeouts are returned as they occur.
    #[instrument(skip(self), fields(turns = self.transcript.len()))]
    pub async fn advance(&mut self, choice: &str) -> FabulaResult<Option<Scene>> {
        if let Err(e) = self.ensure_active() {
            debug!(error = %e, "Ignoring choice");
            return Ok(None);
        }

        let normalized = self.exchange(continuation_prompt(choice)).await?;
        debug!(source = %normalized.source, "Story advanced");
        Ok(Some(normalized.into_scene()))
    }

    fn ensure_active(&self) -> FabulaResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(NarrativeError::new(NarrativeErrorKind::InactiveSession).into())
        }
    }

    /// Send one prompt with the transcript and record the exchange on success.
    async fn exchange(&mut self, message: String) -> FabulaResult<NormalizedScene> {
        let prompt = Turn::user(with_format_instructions(&message));

        let mut turns = self.transcript.clone();
        turns.push(prompt.clone());

        let request = GenerateRequest::builder()
            .turns(turns)
            .build()
            .map_err(BuilderError::from)?;

        let response = tokio::time::timeout(self.timeout, self.driver.generate(&request))
            .await
            .map_err(|_| {
                NarrativeError::new(NarrativeErrorKind::RequestFailed(format!(
                    "no reply within {}s",
                    self.timeout.as_secs()
                )))
            })??;

        let reply = response.text();
        debug!(reply_length = reply.len(), "Reply received");
        let normalized = normalize_reply(&reply);

        self.transcript.push(prompt);
        self.transcript.push(Turn::model(reply));
        Ok(normalized)
    }
}
