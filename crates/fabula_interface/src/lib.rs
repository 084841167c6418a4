//! Trait definitions for the Fabula engine.
//!
//! The narrative layer talks to the outside world only through these
//! traits, so sessions can be driven by the real Gemini client or by a
//! scripted stand-in.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageDriver, StoryDriver};
