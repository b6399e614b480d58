//! Offline content generator - Deterministic text derived from the prompt itself
//!
//! Used when no model server is reachable. The same prompt always yields the
//! same reply, which keeps whole pipeline runs reproducible.

use async_trait::async_trait;

use crate::application::ports::outbound::{ContentError, ContentGeneratorPort, ContentRequest};

const STOP_WORDS: &[&str] = &[
    "about", "after", "against", "their", "there", "these", "where", "which", "while", "with",
    "from", "into", "that", "this", "game", "games", "player", "players",
];

#[derive(Debug, Clone, Default)]
pub struct OfflineContentGenerator;

impl OfflineContentGenerator {
    pub fn new() -> Self {
        Self
    }

    fn reply_for(prompt: &str) -> String {
        let theme = field(prompt, "Theme:").unwrap_or("the world");

        if let Some(elements) = section(prompt, "Story elements:") {
            return elements
                .iter()
                .map(|name| format!("{}: {} artwork for {}", name, theme, name.to_lowercase()))
                .collect::<Vec<_>>()
                .join("\n");
        }

        if let Some(levels) = section(prompt, "Levels:") {
            let mut notes: Vec<String> = levels
                .iter()
                .take(3)
                .map(|level| {
                    let name = level.split(" (").next().unwrap_or(level);
                    format!("{} rewards careful exploration", name)
                })
                .collect();
            notes.push(format!("Keep the {} mood in every encounter", theme));
            return notes.join("\n");
        }

        match field(prompt, "Description:") {
            Some(description) => keywords(description, 3).join(" "),
            None => String::new(),
        }
    }
}

#[async_trait]
impl ContentGeneratorPort for OfflineContentGenerator {
    async fn generate_text(&self, request: ContentRequest) -> Result<String, ContentError> {
        Ok(Self::reply_for(&request.prompt))
    }

    fn backend_name(&self) -> &str {
        "offline"
    }
}

/// Value of the first `Key: value` line
fn field<'a>(prompt: &'a str, key: &str) -> Option<&'a str> {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix(key))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// `- item` lines following a heading line
fn section<'a>(prompt: &'a str, heading: &str) -> Option<Vec<&'a str>> {
    let mut lines = prompt.lines().skip_while(|line| line.trim() != heading);
    lines.next()?;
    let items: Vec<&str> = lines
        .map_while(|line| line.trim().strip_prefix("- "))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    Some(items)
}

fn keywords(text: &str, limit: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|word| word.len() > 3 && !STOP_WORDS.contains(&word.as_str()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_theme_from_description() {
        let generator = OfflineContentGenerator::new();
        let reply = generator
            .generate_text(ContentRequest::new(
                "Description: A lighthouse keeper fights the sea monsters\nGame type: action\n",
            ))
            .await
            .unwrap();
        assert_eq!(reply, "lighthouse keeper fights");
    }

    #[test]
    fn test_asset_lines_per_element() {
        let reply = OfflineContentGenerator::reply_for(
            "Theme: haunted coast\nStory elements:\n- The Hero\n- Ancient Relic\n",
        );
        assert_eq!(
            reply,
            "The Hero: haunted coast artwork for the hero\nAncient Relic: haunted coast artwork for ancient relic"
        );
    }

    #[test]
    fn test_notes_from_levels() {
        let reply = OfflineContentGenerator::reply_for(
            "Theme: ruins\nLevels:\n- Level 1 (difficulty 2, 3 challenges)\n- Level 2 (difficulty 4, 4 challenges)\n",
        );
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Level 1 rewards careful exploration");
        assert_eq!(lines[2], "Keep the ruins mood in every encounter");
    }

    #[test]
    fn test_deterministic() {
        let prompt = "Description: Space pirates steal moons";
        assert_eq!(
            OfflineContentGenerator::reply_for(prompt),
            OfflineContentGenerator::reply_for(prompt)
        );
    }
}
