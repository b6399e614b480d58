//! Prompt building functions for content generator requests

use crate::application::dto::{AssetBrief, GameBlueprint, GenerationRequest};
use crate::application::ports::outbound::ContentRequest;
use crate::domain::services::GameNarrative;

/// Sampling settings shared by every pipeline request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
        }
    }
}

const THEME_SYSTEM_PROMPT: &str = "You distil game pitches into a theme. \
Answer with a short theme phrase of at most five words and nothing else.";

const NOTES_SYSTEM_PROMPT: &str = "You are a gameplay designer writing notes for programmers. \
Answer with at most five short lines, one gameplay rule per line.";

const ASSET_SYSTEM_PROMPT: &str = "You are an art director listing the assets a game needs. \
Answer with one asset per line in the form `name: description`.";

const MAX_THEME_WORDS: usize = 5;
const MAX_NOTES: usize = 5;

fn with_settings(request: ContentRequest, settings: &ContentSettings) -> ContentRequest {
    ContentRequest {
        temperature: Some(settings.temperature),
        max_tokens: Some(settings.max_tokens),
        ..request
    }
}

/// Ask for a short theme phrase distilled from the client's pitch
pub fn theme_request(
    request: &GenerationRequest,
    blueprint: &GameBlueprint,
    settings: &ContentSettings,
) -> ContentRequest {
    let mut prompt = String::new();
    prompt.push_str(&format!("Description: {}\n", request.prompt.trim()));
    prompt.push_str(&format!("Game type: {}\n", request.game_type));
    prompt.push_str(&format!("Genre: {}\n", blueprint.theme));
    if let Some(details) = request.additional_details.as_deref() {
        if !details.trim().is_empty() {
            prompt.push_str(&format!("Details: {}\n", details.trim()));
        }
    }

    with_settings(
        ContentRequest::new(prompt).with_system_prompt(THEME_SYSTEM_PROMPT),
        settings,
    )
}

/// Ask for gameplay notes that end up as comments in the level scripts
pub fn gameplay_notes_request(
    theme: &str,
    blueprint: &GameBlueprint,
    narrative: &GameNarrative,
    settings: &ContentSettings,
) -> ContentRequest {
    let mut prompt = String::new();
    prompt.push_str(&format!("Theme: {}\n", theme));
    prompt.push_str(&format!("Engine: {}\n", blueprint.engine));
    prompt.push_str(&format!("Story: {}\n", narrative.story.title));
    prompt.push_str(&format!("Objective: {}\n", narrative.story.main_objective));
    prompt.push_str("Levels:\n");
    for level in &narrative.levels {
        prompt.push_str(&format!(
            "- {} (difficulty {}, {} challenges)\n",
            level.name,
            level.difficulty,
            level.challenges.len()
        ));
    }

    with_settings(
        ContentRequest::new(prompt).with_system_prompt(NOTES_SYSTEM_PROMPT),
        settings,
    )
}

/// Ask for one asset brief per story element
pub fn asset_briefs_request(
    theme: &str,
    narrative: &GameNarrative,
    settings: &ContentSettings,
) -> ContentRequest {
    let mut prompt = String::new();
    prompt.push_str(&format!("Theme: {}\n", theme));
    prompt.push_str("Story elements:\n");
    for element in &narrative.story.elements {
        prompt.push_str(&format!("- {}\n", element.name));
    }

    with_settings(
        ContentRequest::new(prompt).with_system_prompt(ASSET_SYSTEM_PROMPT),
        settings,
    )
}

/// First non-empty line of the reply, stripped of quotes and trailing
/// punctuation and cut to a few words; `fallback` when nothing is left
pub fn parse_theme(reply: &str, fallback: &str) -> String {
    let line = reply
        .lines()
        .map(|l| l.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`'))
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let line = line
        .strip_prefix("Theme:")
        .unwrap_or(line)
        .trim_end_matches(['.', '!'])
        .trim();

    let theme = line
        .split_whitespace()
        .take(MAX_THEME_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if theme.is_empty() {
        fallback.to_string()
    } else {
        theme.to_lowercase()
    }
}

/// Non-empty reply lines with list markers removed
pub fn parse_notes(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(strip_list_marker)
        .filter(|l| !l.is_empty())
        .take(MAX_NOTES)
        .map(String::from)
        .collect()
}

/// One brief per non-empty `name: description` line.
///
/// Lines without a colon keep the whole line as the name.
pub fn parse_asset_briefs(reply: &str) -> Vec<AssetBrief> {
    reply
        .lines()
        .map(strip_list_marker)
        .filter(|l| !l.is_empty())
        .map(|line| match line.split_once(':') {
            Some((name, description)) => AssetBrief {
                name: name.trim().to_string(),
                description: description.trim().to_string(),
            },
            None => AssetBrief {
                name: line.to_string(),
                description: String::new(),
            },
        })
        .filter(|brief| !brief.name.is_empty())
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    // "1. ", "2) "
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }
    line.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GameEngine;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "  A lighthouse keeper fights sea monsters ".to_string(),
            game_type: "action".to_string(),
            genre: Some("horror".to_string()),
            additional_details: Some("foggy".to_string()),
            engine: None,
        }
    }

    #[test]
    fn test_theme_request() {
        let req = request();
        let blueprint = GameBlueprint::derive(&req, GameEngine::Unity).unwrap();
        let content = theme_request(&req, &blueprint, &ContentSettings::default());

        assert!(content.prompt.contains("Description: A lighthouse keeper fights sea monsters\n"));
        assert!(content.prompt.contains("Genre: horror"));
        assert!(content.prompt.contains("Details: foggy"));
        assert_eq!(content.temperature, Some(0.7));
        assert_eq!(content.max_tokens, Some(512));
        assert!(content.system_prompt.unwrap().contains("theme"));
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!(parse_theme("\n\"Haunted Coast.\"\nmore", "x"), "haunted coast");
        assert_eq!(parse_theme("Theme: Deep Sea Dread", "x"), "deep sea dread");
        assert_eq!(parse_theme("   \n  ", "fantasy"), "fantasy");
        assert_eq!(parse_theme("one two three four five six seven", "x"), "one two three four five");
    }

    #[test]
    fn test_parse_notes() {
        let notes = parse_notes("1. Jump over gaps\n\n- Collect lamps\n* Avoid tides\n");
        assert_eq!(notes, vec!["Jump over gaps", "Collect lamps", "Avoid tides"]);
    }

    #[test]
    fn test_parse_asset_briefs() {
        let briefs = parse_asset_briefs("- Lighthouse: tall tower sprite\nFog\n\n: nameless\n");
        assert_eq!(briefs.len(), 2);
        assert_eq!(briefs[0].name, "Lighthouse");
        assert_eq!(briefs[0].description, "tall tower sprite");
        assert_eq!(briefs[1].name, "Fog");
        assert!(briefs[1].description.is_empty());
    }
}
