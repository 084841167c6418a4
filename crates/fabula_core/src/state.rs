//! Observable game state consumed by front-ends.

use crate::Scene;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Lifecycle of an adventure as seen by the presentation layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// No adventure yet, waiting for a theme
    #[default]
    #[display("start")]
    Start,
    /// A scene is on screen and choices are accepted
    #[display("playing")]
    Playing,
    /// A scene request is in flight
    #[display("loading")]
    Loading,
    /// The last scene request failed
    #[display("error")]
    Error,
}

/// Snapshot of everything a front-end renders.
///
/// Only [`GameStatus::Playing`] carries a scene. The image slot is
/// independent: illustrations arrive whenever they resolve.
///
/// # Examples
///
/// ```
/// use fabula_core::{GameState, GameStatus, Scene};
///
/// let state = GameState::playing(Scene::new("A quiet shore.", ["Swim", "Walk"]));
/// assert_eq!(*state.status(), GameStatus::Playing);
/// assert!(state.image_ref().is_none());
///
/// let failed = GameState::failed("quota exceeded");
/// assert!(failed.scene().is_none());
/// assert_eq!(failed.error().as_deref(), Some("quota exceeded"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Getters)]
pub struct GameState {
    /// Current lifecycle status
    status: GameStatus,
    /// Scene on screen, present only while playing
    scene: Option<Scene>,
    /// Illustration reference (data URI or URL), if one has resolved
    image_ref: Option<String>,
    /// Readable failure message, present only in the error status
    error: Option<String>,
}

impl GameState {
    /// The initial state before any adventure.
    pub fn start() -> Self {
        Self::default()
    }

    /// A scene request is in flight.
    pub fn loading() -> Self {
        Self {
            status: GameStatus::Loading,
            ..Self::default()
        }
    }

    /// A scene is ready; the image slot starts empty.
    pub fn playing(scene: Scene) -> Self {
        Self {
            status: GameStatus::Playing,
            scene: Some(scene),
            ..Self::default()
        }
    }

    /// The last scene request failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: GameStatus::Error,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Replaces the illustration reference, leaving everything else alone.
    pub fn set_image_ref(&mut self, image_ref: impl Into<String>) {
        self.image_ref = Some(image_ref.into());
    }
}
