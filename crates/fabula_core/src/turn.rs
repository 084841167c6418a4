//! Transcript turns.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One entry of a conversation transcript.
///
/// # Examples
///
/// ```
/// use fabula_core::{Role, Turn};
///
/// let turn = Turn::user("Create an opening scene");
/// assert_eq!(turn.role, Role::User);
/// assert_eq!(turn.text, "Create an opening scene");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced the text
    pub role: Role,
    /// The text exactly as sent or received
    pub text: String,
}

impl Turn {
    /// A prompt sent to the model.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// A reply received from the model.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}
