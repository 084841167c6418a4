//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who produced a turn in the transcript.
///
/// # Examples
///
/// ```
/// use fabula_core::Role;
///
/// assert_ne!(Role::User, Role::Model);
/// assert_eq!(format!("{}", Role::Model), "Model");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// Prompts sent on behalf of the player
    User,
    /// Replies from the language model
    Model,
}
