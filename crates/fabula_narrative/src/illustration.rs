//! Scene illustrations with a deterministic offline substitute.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fabula_core::{FabulaConfig, ImageRequest, IllustrationConfig};
use fabula_error::{FabulaError, FabulaResult, NarrativeError, NarrativeErrorKind};
use fabula_interface::ImageDriver;
use tracing::{debug, info, instrument, warn};

const DUNGEON_KEYWORDS: [&str; 5] = ["chamber", "stone", "dungeon", "torch", "wall"];
const FOREST_KEYWORDS: [&str; 3] = ["forest", "tree", "woods"];
const SETTLEMENT_KEYWORDS: [&str; 7] = [
    "cottage", "house", "village", "town", "market", "path", "road",
];

/// Visual flavor of a scene, inferred from its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SceneFlavor {
    /// Stone, torches and dungeon walls
    #[display("dungeon")]
    Dungeon,
    /// Trees and woods
    #[display("forest")]
    Forest,
    /// Villages, houses and roads
    #[display("settlement")]
    Settlement,
    /// Nothing recognizable
    #[display("plain")]
    Plain,
}

/// Flavor keywords found in a description, case-insensitively, in vocabulary order.
///
/// # Examples
///
/// ```
/// use fabula_narrative::scene_keywords;
///
/// let found = scene_keywords("A TORCH flickers on the stone Wall.");
/// assert_eq!(found, vec!["stone", "torch", "wall"]);
/// ```
pub fn scene_keywords(description: &str) -> Vec<&'static str> {
    let lower = description.to_lowercase();
    DUNGEON_KEYWORDS
        .iter()
        .chain(FOREST_KEYWORDS.iter())
        .chain(SETTLEMENT_KEYWORDS.iter())
        .copied()
        .filter(|keyword| lower.contains(keyword))
        .collect()
}

/// Flavor of a description. Dungeon terms win over forest terms, which win
/// over settlement terms.
pub fn scene_flavor(description: &str) -> SceneFlavor {
    let keywords = scene_keywords(description);
    let any_of = |group: &[&str]| keywords.iter().any(|k| group.contains(k));

    if any_of(&DUNGEON_KEYWORDS) {
        SceneFlavor::Dungeon
    } else if any_of(&FOREST_KEYWORDS) {
        SceneFlavor::Forest
    } else if any_of(&SETTLEMENT_KEYWORDS) {
        SceneFlavor::Settlement
    } else {
        SceneFlavor::Plain
    }
}

/// Stable seed in `0..10000` derived from a description.
///
/// Rolling hash over UTF-16 code units (`h * 31 + unit`, wrapped to i32 at
/// every step), then the absolute value modulo 10000. The same description
/// always yields the same seed across runs and platforms.
///
/// # Examples
///
/// ```
/// use fabula_narrative::scene_seed;
///
/// assert_eq!(scene_seed(""), 0);
/// assert_eq!(scene_seed("a"), 97);
/// assert_eq!(scene_seed("You stand before a lighthouse."), 161);
/// ```
pub fn scene_seed(description: &str) -> u32 {
    let hash = description.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs() % 10_000
}

/// Placeholder image reference for a description.
///
/// Dungeon scenes get a grayscale image, forest scenes a neighbouring seed,
/// anything else the plain seed.
///
/// # Examples
///
/// ```
/// use fabula_narrative::placeholder_ref;
///
/// assert_eq!(
///     placeholder_ref("https://picsum.photos", "A quiet forest clearing."),
///     "https://picsum.photos/seed/9698/400/300"
/// );
/// ```
pub fn placeholder_ref(base_url: &str, description: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let seed = scene_seed(description);
    match scene_flavor(description) {
        SceneFlavor::Dungeon => format!("{}/seed/{}/400/300?grayscale", base, seed),
        SceneFlavor::Forest => format!("{}/seed/{}/400/300", base, seed + 1),
        SceneFlavor::Settlement | SceneFlavor::Plain => {
            format!("{}/seed/{}/400/300", base, seed)
        }
    }
}

/// Inline `data:` reference for image bytes.
pub fn data_reference(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Turns scene descriptions into illustration references.
///
/// Failures never escape: a billing refusal becomes a placeholder, any
/// other failure becomes `None`.
#[derive(Clone)]
pub struct IllustrationResolver {
    driver: Arc<dyn ImageDriver>,
    config: IllustrationConfig,
    timeout: Duration,
}

impl std::fmt::Debug for IllustrationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IllustrationResolver")
            .field("model", &self.driver.model_name())
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl IllustrationResolver {
    /// Create a resolver from the illustration and session settings.
    pub fn new(driver: Arc<dyn ImageDriver>, config: &FabulaConfig) -> Self {
        Self {
            driver,
            config: config.illustration.clone(),
            timeout: config.session.request_timeout(),
        }
    }

    /// Illustration reference for a scene description, if one can be had.
    #[instrument(skip(self, description), fields(model = %self.driver.model_name(), description_len = description.len()))]
    pub async fn request_illustration(&self, description: &str) -> Option<String> {
        match self.generate(description).await {
            Ok(Some(reference)) => {
                info!("Illustration generated");
                Some(reference)
            }
            Ok(None) => {
                warn!("Image service returned no images");
                None
            }
            Err(e) if is_billing(&e) => {
                let reference = placeholder_ref(&self.config.placeholder_base_url, description);
                info!(
                    placeholder = %reference,
                    flavor = %scene_flavor(description),
                    "Image model requires billing, using placeholder"
                );
                Some(reference)
            }
            Err(e) => {
                warn!(error = %e, "Illustration failed");
                None
            }
        }
    }

    async fn generate(&self, description: &str) -> FabulaResult<Option<String>> {
        let request = ImageRequest::builder()
            .prompt(format!("{}{}", self.config.art_direction, description))
            .count(1u32)
            .mime_type(self.config.mime_type.clone())
            .aspect_ratio(self.config.aspect_ratio.clone())
            .build()
            .map_err(fabula_error::BuilderError::from)?;

        let response = tokio::time::timeout(self.timeout, self.driver.generate_images(&request))
            .await
            .map_err(|_| {
                NarrativeError::new(NarrativeErrorKind::RequestFailed(format!(
                    "illustration timed out after {}s",
                    self.timeout.as_secs()
                )))
            })??;

        let images = response.images();
        debug!(count = images.len(), "Image response received");

        Ok(images.first().map(|(mime, bytes)| {
            data_reference(mime.unwrap_or(self.config.mime_type.as_str()), bytes)
        }))
    }
}

fn is_billing(error: &FabulaError) -> bool {
    error
        .as_gemini()
        .is_some_and(|gemini| gemini.kind.is_billing())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reference_values() {
        assert_eq!(scene_seed("A damp dungeon corridor lit by a single torch."), 5802);
        assert_eq!(scene_seed("A quiet forest clearing."), 9697);
        assert_eq!(scene_seed("The Dungeon Gate"), 4320);
    }

    #[test]
    fn test_seed_is_bounded() {
        let long = "The wind howls across the endless tundra. ".repeat(200);
        assert!(scene_seed(&long) < 10_000);
    }

    #[test]
    fn test_flavor_precedence() {
        assert_eq!(scene_flavor("A forest of stone pillars."), SceneFlavor::Dungeon);
        assert_eq!(scene_flavor("A road through the woods."), SceneFlavor::Forest);
        assert_eq!(scene_flavor("The village market."), SceneFlavor::Settlement);
        assert_eq!(scene_flavor("An open sea."), SceneFlavor::Plain);
    }

    #[test]
    fn test_data_reference() {
        assert_eq!(data_reference("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_placeholder_trims_trailing_slash() {
        assert_eq!(
            placeholder_ref("http://localhost/", "The Dungeon Gate"),
            "http://localhost/seed/4320/400/300?grayscale"
        );
    }
}
