//! The append-only step list and its cursor.

use crate::choice::Choice;
use crate::error::{StoryError, StoryResult};
use crate::step::Step;

/// The append-only list of generated steps plus the cursor on the displayed one.
///
/// Steps are never removed or reordered. The only mutation of an existing
/// step is recording its selected choice, once, while it is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStore {
    steps: Vec<Step>,
    current: usize,
}

impl StepStore {
    /// Start a history from the opening step.
    pub fn new(opening: Step) -> Self {
        Self {
            steps: vec![opening],
            current: 0,
        }
    }

    /// All steps, oldest first.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get a step by index.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: a store is seeded with its opening step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the displayed step.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The displayed step.
    pub fn current_step(&self) -> &Step {
        &self.steps[self.current]
    }

    /// Index of the newest step.
    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// Record the player's choice on the step at `index`.
    ///
    /// Only the current step can be answered, and only once.
    pub fn set_selected_choice(&mut self, index: usize, choice: Choice) -> StoryResult<()> {
        if index != self.current {
            return Err(StoryError::StaleStep {
                index,
                current: self.current,
            });
        }
        let step = &mut self.steps[index];
        if step.is_answered() {
            return Err(StoryError::AlreadyAnswered(index));
        }
        step.selected_choice = Some(choice);
        Ok(())
    }

    /// Append the step generated in response to the current step's choice.
    ///
    /// The cursor must be on the newest step and that step must be answered.
    /// Returns the new step's index; the cursor is left where it was.
    pub fn append(&mut self, step: Step) -> StoryResult<usize> {
        let last = self.last_index();
        if self.current != last {
            return Err(StoryError::InvalidTransition(format!(
                "cursor is on step {} but the newest step is {last}",
                self.current
            )));
        }
        if !self.steps[last].is_answered() {
            return Err(StoryError::InvalidTransition(format!(
                "step {last} has no selected choice"
            )));
        }
        self.steps.push(step);
        Ok(last + 1)
    }

    /// Move the cursor. Step contents are untouched.
    pub fn move_to(&mut self, index: usize) -> StoryResult<()> {
        if index >= self.steps.len() {
            return Err(StoryError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.steps.len(),
            });
        }
        self.current = index;
        Ok(())
    }
}
