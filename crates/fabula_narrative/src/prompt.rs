//! Prompt text sent to the language model.

/// Instruction block appended to every prompt, asking for a bare JSON scene.
pub const FORMAT_INSTRUCTIONS: &str = r#"Please respond with ONLY a valid JSON object in this exact format (no markdown, no extra text, no nested JSON):
{
  "description": "A detailed, evocative description of the current scene, environment, and any characters or events. Should be 2-4 sentences long.",
  "choices": ["Choice 1", "Choice 2", "Choice 3", "Choice 4"]
}

IMPORTANT: 
- Return ONLY the JSON object, nothing else
- Do not wrap in markdown code blocks
- Do not include any control characters or special formatting
- Ensure all strings are properly escaped
- Include exactly 4 choices"#;

/// Prompt asking for the opening scene of an adventure.
///
/// # Examples
///
/// ```
/// use fabula_narrative::opening_prompt;
///
/// let prompt = opening_prompt("a haunted lighthouse");
/// assert!(prompt.contains("Theme: \"a haunted lighthouse\""));
/// ```
pub fn opening_prompt(theme: &str) -> String {
    format!(
        "Create an opening scene for a text adventure game. Theme: \"{}\". Describe the starting location and situation.",
        theme
    )
}

/// Prompt continuing the story after the player picked a choice.
///
/// The choice text is embedded literally, quotes and all.
pub fn continuation_prompt(choice: &str) -> String {
    format!(
        "The player chose: \"{}\". Continue the story and describe what happens next.",
        choice
    )
}

/// Appends [`FORMAT_INSTRUCTIONS`] to a prompt, separated by a blank line.
pub fn with_format_instructions(message: &str) -> String {
    format!("{}\n\n{}", message, FORMAT_INSTRUCTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_embeds_choice_verbatim() {
        let prompt = continuation_prompt(r#"Say "hello" to the keeper"#);
        assert_eq!(
            prompt,
            r#"The player chose: "Say "hello" to the keeper". Continue the story and describe what happens next."#
        );
    }

    #[test]
    fn format_instructions_follow_message() {
        let prompt = with_format_instructions("Go north.");
        assert!(prompt.starts_with("Go north.\n\n"));
        assert!(prompt.ends_with("Include exactly 4 choices"));
    }
}
