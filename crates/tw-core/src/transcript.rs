//! Markdown, text, and JSON export of a story history.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::step::Step;

/// A snapshot of a story history, ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// The protagonist.
    pub character: Character,
    /// Language code the story was told in.
    pub language: String,
    /// Every generated step, oldest first.
    pub steps: Vec<Step>,
}

impl Transcript {
    /// Capture a history.
    pub fn new(character: Character, language: impl Into<String>, steps: &[Step]) -> Self {
        Self {
            character,
            language: language.into(),
            steps: steps.to_vec(),
        }
    }

    /// Whether the last step ends the story.
    pub fn is_finished(&self) -> bool {
        self.steps.last().is_some_and(Step::is_ending)
    }

    /// Export as markdown.
    pub fn export_markdown(&self) -> String {
        let mut out = format!("# {}\n\n", self.character.name);
        out.push_str(&format!(
            "*{}* | language: {}\n\n",
            self.character.description, self.language
        ));
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("## Step {}\n\n", i + 1));
            out.push_str(step.story_text.trim());
            out.push_str("\n\n");
            if let Some(choice) = &step.selected_choice {
                if choice.is_custom {
                    out.push_str(&format!("> **You**: {} *(your own action)*\n\n", choice.text));
                } else {
                    out.push_str(&format!("> **You**: {}\n\n", choice.text));
                }
            }
        }
        if self.is_finished() {
            out.push_str("*The End*\n");
        }
        out
    }

    /// Export as plain text.
    pub fn export_text(&self) -> String {
        let title = format!("{} - {}", self.character.name, self.character.description);
        let mut out = format!("{title}\n{}\n\n", "=".repeat(title.chars().count()));
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("--- Step {} ---\n", i + 1));
            out.push_str(step.story_text.trim());
            out.push_str("\n\n");
            if let Some(choice) = &step.selected_choice {
                let marker = if choice.is_custom { " (own action)" } else { "" };
                out.push_str(&format!("> {}{marker}\n\n", choice.text));
            }
        }
        if self.is_finished() {
            out.push_str("THE END\n");
        }
        out
    }

    /// Export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::Choice;

    fn finished_story() -> Transcript {
        let mut first = Step::new("You wake in a cave.", vec![Choice::predefined(1, "Leave")]);
        first.selected_choice = Some(Choice::predefined(1, "Leave"));
        let mut second = Step::new("Daylight blinds you.", vec![Choice::predefined(1, "Walk")]);
        second.selected_choice = Some(Choice::custom("shout for help"));
        let third = Step::new("A ranger finds you. You are safe.", vec![]);

        Transcript::new(
            Character::new("Brave Knight", "Strong and honorable"),
            "en",
            &[first, second, third],
        )
    }

    #[test]
    fn markdown_export() {
        let md = finished_story().export_markdown();
        assert!(md.starts_with("# Brave Knight\n"));
        assert!(md.contains("## Step 1\n\nYou wake in a cave."));
        assert!(md.contains("> **You**: Leave\n"));
        assert!(md.contains("> **You**: shout for help *(your own action)*"));
        assert!(md.contains("## Step 3"));
        assert!(md.ends_with("*The End*\n"));
    }

    #[test]
    fn text_export() {
        let txt = finished_story().export_text();
        assert!(txt.starts_with("Brave Knight - Strong and honorable\n===="));
        assert!(txt.contains("--- Step 2 ---\nDaylight blinds you."));
        assert!(txt.contains("> shout for help (own action)"));
        assert!(txt.ends_with("THE END\n"));
    }

    #[test]
    fn unfinished_story_has_no_ending_marker() {
        let t = Transcript::new(
            Character::new("Wise Mage", "Intelligent and mysterious"),
            "fr",
            &[Step::new("Une tour.", vec![Choice::predefined(1, "Monter")])],
        );
        assert!(!t.is_finished());
        assert!(!t.export_markdown().contains("The End"));
        assert!(t.export_markdown().contains("language: fr"));
    }

    #[test]
    fn json_export_restores() {
        let t = finished_story();
        let json = t.to_json().unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
