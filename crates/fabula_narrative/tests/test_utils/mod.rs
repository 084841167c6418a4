//! Test utilities for narrative tests.
//!
//! Scripted story and image drivers that count calls and record requests.

#![allow(dead_code)]

pub mod mock_drivers;

#[allow(unused_imports)]
pub use mock_drivers::{ImageBehavior, MockImageDriver, MockResponse, MockStoryDriver};

use fabula_core::FabulaConfig;

/// Reply used by the end-to-end cases.
pub const LIGHTHOUSE_REPLY: &str = r#"{"description":"You stand before a lighthouse.","choices":["Enter","Leave","Call out","Wait"]}"#;

/// Build a scene reply in the requested JSON shape.
pub fn scene_reply(description: &str, choices: &[&str]) -> String {
    serde_json::json!({ "description": description, "choices": choices }).to_string()
}

/// Bundled configuration with a short request timeout.
pub fn test_config() -> FabulaConfig {
    let mut config = FabulaConfig::default();
    config.session.request_timeout_secs = 5;
    config.illustration.placeholder_base_url = "https://placeholder.test".to_string();
    config
}
