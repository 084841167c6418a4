//! The scene record produced for every story step.

use derive_getters::Getters;
use serde::Serialize;

/// Maximum number of choices a scene offers.
pub const MAX_CHOICES: usize = 4;

/// One step of the adventure: what the player sees and what they may do.
///
/// Choices beyond [`MAX_CHOICES`] are discarded on construction; fewer are
/// kept as they are.
///
/// # Examples
///
/// ```
/// use fabula_core::Scene;
///
/// let scene = Scene::new(
///     "A fork in the road.",
///     ["Left", "Right", "Back", "Wait", "Sing"],
/// );
///
/// assert_eq!(scene.description(), "A fork in the road.");
/// assert_eq!(scene.choices(), &["Left", "Right", "Back", "Wait"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Getters)]
pub struct Scene {
    /// Narrative text for the scene
    description: String,
    /// Options offered to the player, in order
    choices: Vec<String>,
}

impl Scene {
    /// Builds a scene, keeping at most [`MAX_CHOICES`] choices.
    pub fn new<I, S>(description: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            choices: choices
                .into_iter()
                .take(MAX_CHOICES)
                .map(Into::into)
                .collect(),
        }
    }

    /// The choice at a zero-based position.
    pub fn choice(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(String::as_str)
    }
}
