//! Recovery of scene records from raw language-model replies.
//!
//! Models asked for "ONLY a JSON object" still wrap it in markdown fences,
//! leave trailing commas, embed control characters or answer in prose.
//! [`normalize_reply`] turns any of those into a usable [`Scene`] and never
//! fails: text it cannot repair becomes one of two fixed fallback scenes.

use std::sync::LazyLock;

use fabula_core::{MAX_CHOICES, Scene};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Description used when a JSON candidate exists but cannot be used.
pub const FALLBACK_DESCRIPTION: &str = "You find yourself in a mysterious place. The air is thick with possibility and adventure awaits around every corner.";

/// Choices paired with [`FALLBACK_DESCRIPTION`].
pub const FALLBACK_CHOICES: [&str; 4] = [
    "Explore the area",
    "Call out to see if anyone is nearby",
    "Search for clues",
    "Proceed with caution",
];

/// Choices offered when the reply contained no JSON object at all.
pub const RAW_TEXT_CHOICES: [&str; 4] = [
    "Continue forward",
    "Look around carefully",
    "Rest and think",
    "Try a different approach",
];

/// Characters of raw text kept as the description of a prose-only reply.
const RAW_TEXT_PREVIEW_CHARS: usize = 200;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:json)?\s*").expect("Valid leading fence regex"));

static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```\s*$").expect("Valid trailing fence regex"));

static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z]*\s*$").expect("Valid fence line regex"));

static FIRST_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("Valid object regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("Valid trailing comma regex"));

/// How a scene was obtained from the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SceneSource {
    /// The reply held a usable JSON object
    #[display("parsed")]
    Parsed,
    /// No JSON object was found; the description is a preview of the raw text
    #[display("raw text fallback")]
    RawTextFallback,
    /// A JSON candidate was found but could not be parsed or validated
    #[display("default fallback")]
    DefaultFallback,
}

/// A scene together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedScene {
    /// The recovered scene
    pub scene: Scene,
    /// Which normalization path produced it
    pub source: SceneSource,
}

impl NormalizedScene {
    fn parsed(scene: Scene) -> Self {
        Self {
            scene,
            source: SceneSource::Parsed,
        }
    }

    fn raw_text(raw: &str) -> Self {
        let preview: String = raw.chars().take(RAW_TEXT_PREVIEW_CHARS).collect();
        Self {
            scene: Scene::new(format!("{}...", preview), RAW_TEXT_CHOICES),
            source: SceneSource::RawTextFallback,
        }
    }

    fn default_fallback() -> Self {
        Self {
            scene: Scene::new(FALLBACK_DESCRIPTION, FALLBACK_CHOICES),
            source: SceneSource::DefaultFallback,
        }
    }

    /// Discards the provenance.
    pub fn into_scene(self) -> Scene {
        self.scene
    }
}

/// Recover a scene from a raw model reply.
///
/// The pipeline strips markdown fences and control characters, picks the
/// first `{...}` object, repairs trailing commas and validates the result.
/// A reply without any object yields a scene previewing the raw text; an
/// object that still cannot be used yields [`FALLBACK_DESCRIPTION`].
///
/// # Examples
///
/// ```
/// use fabula_narrative::{SceneSource, normalize_reply};
///
/// let raw = "```json\n{\"description\": \"A cave.\", \"choices\": [\"In\", \"Out\",]}\n```";
/// let normalized = normalize_reply(raw);
///
/// assert_eq!(normalized.source, SceneSource::Parsed);
/// assert_eq!(normalized.scene.description(), "A cave.");
/// assert_eq!(normalized.scene.choices(), &["In", "Out"]);
/// ```
pub fn normalize_reply(raw: &str) -> NormalizedScene {
    let text = strip_fences(raw.trim());
    let text = strip_control(&text, true);
    let text = drop_nested_fence_lines(text);

    let Some(candidate) = find_candidate(&text) else {
        warn!(
            reply_length = raw.len(),
            "No JSON object in reply, using raw text"
        );
        return NormalizedScene::raw_text(raw);
    };

    let candidate = strip_control(candidate, false);
    let candidate = TRAILING_COMMA.replace_all(&candidate, "$1");

    match parse_scene(&candidate) {
        Some(scene) => {
            debug!(choices = scene.choices().len(), "Parsed scene from reply");
            NormalizedScene::parsed(scene)
        }
        None => {
            warn!(
                candidate = %candidate,
                "Reply JSON unusable, using fallback scene"
            );
            NormalizedScene::default_fallback()
        }
    }
}

fn strip_fences(text: &str) -> String {
    let text = LEADING_FENCE.replace(text, "");
    TRAILING_FENCE.replace(&text, "").into_owned()
}

/// Removes C0, DEL and C1 characters, optionally sparing line feeds.
fn strip_control(text: &str, keep_newlines: bool) -> String {
    text.chars()
        .filter(|c| !c.is_control() || (keep_newlines && *c == '\n'))
        .collect()
}

/// Drops fence-only lines and fenced `"description"` openers left inside the body.
///
/// A fence followed by content on the same line is kept so the content survives.
fn drop_nested_fence_lines(text: String) -> String {
    if !text.contains("```") {
        return text;
    }

    text.lines()
        .filter(|line| {
            !FENCE_LINE.is_match(line)
                && !line.trim().starts_with(r#""description": "```json"#)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_candidate(text: &str) -> Option<&str> {
    if let Some(m) = FIRST_OBJECT.find(text) {
        return Some(m.as_str());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_scene(candidate: &str) -> Option<Scene> {
    let value: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Candidate is not valid JSON");
            return None;
        }
    };

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())?;

    let choices: Vec<String> = value
        .get("choices")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(choice_text)
        .take(MAX_CHOICES)
        .collect();

    if choices.is_empty() {
        return None;
    }

    Some(Scene::new(description, choices))
}

fn choice_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
