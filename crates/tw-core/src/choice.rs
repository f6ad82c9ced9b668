//! Choices and the validation of raw input into them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoryError, StoryResult};
use crate::step::Step;

/// Id carried by every free-text choice. Generator-assigned ids are never negative.
pub const CUSTOM_CHOICE_ID: i64 = -1;

/// An action the player takes on a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Generator-assigned id, or [`CUSTOM_CHOICE_ID`] for free text.
    pub id: i64,
    /// The action as shown to (or typed by) the player.
    pub text: String,
    /// Whether the player typed this action instead of picking one.
    #[serde(default)]
    pub is_custom: bool,
}

impl Choice {
    /// A choice offered by the generator.
    pub fn predefined(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_custom: false,
        }
    }

    /// A free-text choice. The text is stored as given; use [`apply_choice`]
    /// to trim and validate raw input.
    pub fn custom(text: impl Into<String>) -> Self {
        Self {
            id: CUSTOM_CHOICE_ID,
            text: text.into(),
            is_custom: true,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_custom {
            write!(f, "{} (custom)", self.text)
        } else {
            write!(f, "[{}] {}", self.id, self.text)
        }
    }
}

/// Raw player input before it becomes a [`Choice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceInput {
    /// One of the choices the step offered, passed through as-is.
    Predefined(Choice),
    /// An offered choice addressed by its id only.
    ById(i64),
    /// Free text typed by the player.
    Custom(String),
}

/// Turn raw input into a well-formed choice for `step`.
///
/// Predefined input must match one of the step's offered choices; custom
/// text is trimmed and must not be empty. Steps that offer nothing are
/// endings and accept no input at all.
///
/// Whether the step has already been answered is not checked here; the
/// [`StepStore`](crate::StepStore) rejects that when the choice is recorded.
pub fn apply_choice(step: &Step, input: ChoiceInput) -> StoryResult<Choice> {
    if step.is_ending() {
        return Err(StoryError::StoryEnded);
    }

    match input {
        ChoiceInput::Predefined(choice) => {
            if step.choices.contains(&choice) {
                Ok(choice)
            } else {
                Err(StoryError::NotOffered(choice.id))
            }
        }
        ChoiceInput::ById(id) => step
            .choices
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoryError::NotOffered(id)),
        ChoiceInput::Custom(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(StoryError::EmptyChoice)
            } else {
                Ok(Choice::custom(trimmed))
            }
        }
    }
}
