//! Offline debugging commands.

use fabula::{FabulaConfig, FabulaResult, JsonError, normalize_reply, placeholder_ref, scene_seed};
use std::path::Path;
use tracing::{info, instrument};

/// Run the normalizer over a saved reply and print the scene as JSON.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn normalize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let normalized = normalize_reply(&raw);
    info!(source = %normalized.source, "Reply normalized");

    println!("{}", scene_json(&normalized.scene)?);
    Ok(())
}

fn scene_json(scene: &fabula::Scene) -> FabulaResult<String> {
    serde_json::to_string_pretty(scene)
        .map_err(|e| JsonError::new(format!("Failed to serialize scene: {}", e)).into())
}

/// Print the placeholder reference for a description.
#[instrument(skip(config, description))]
pub fn print_placeholder(
    config: &FabulaConfig,
    description: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let reference = placeholder_ref(&config.illustration.placeholder_base_url, description);
    info!(seed = scene_seed(description), "Placeholder derived");

    println!("{}", reference);
    Ok(())
}
