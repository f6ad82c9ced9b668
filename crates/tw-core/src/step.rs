//! Story beats and the generator payload they are built from.

use serde::{Deserialize, Serialize};

use crate::choice::Choice;

/// One beat of the story: the text shown and the choices offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Narrative text of this beat.
    pub story_text: String,
    /// Choices offered by the generator, in display order.
    pub choices: Vec<Choice>,
    /// The choice the player committed on this step, if any.
    #[serde(default)]
    pub selected_choice: Option<Choice>,
}

impl Step {
    /// Create an unanswered step.
    pub fn new(story_text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            story_text: story_text.into(),
            choices,
            selected_choice: None,
        }
    }

    /// Whether the player has acted on this step.
    pub fn is_answered(&self) -> bool {
        self.selected_choice.is_some()
    }

    /// A step with no choices ends the story.
    pub fn is_ending(&self) -> bool {
        self.choices.is_empty()
    }
}

/// What the story generator returns for one beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPayload {
    /// Narrative text; never empty in a well-formed payload.
    pub story_text: String,
    /// Offered choices; empty when the story has ended.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl StoryPayload {
    /// Create a payload.
    pub fn new(story_text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            story_text: story_text.into(),
            choices,
        }
    }
}

impl From<StoryPayload> for Step {
    fn from(payload: StoryPayload) -> Self {
        Step::new(payload.story_text, payload.choices)
    }
}
