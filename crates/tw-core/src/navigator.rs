//! Cursor movement over already generated steps.
//!
//! Moving never generates anything and never touches step contents, so it
//! is always safe, even while a new step is being generated.

use crate::choice::Choice;
use crate::error::{StoryError, StoryResult};
use crate::step::Step;
use crate::store::StepStore;

/// Moves the cursor of a [`StepStore`] backward and forward.
pub struct Navigator<'a> {
    store: &'a mut StepStore,
}

impl<'a> Navigator<'a> {
    /// Navigate over `store`.
    pub fn new(store: &'a mut StepStore) -> Self {
        Self { store }
    }

    /// Step back one beat. Returns the new cursor.
    pub fn prev(&mut self) -> StoryResult<usize> {
        let current = self.store.current_index();
        let Some(target) = current.checked_sub(1) else {
            return Err(StoryError::OutOfRange {
                index: -1,
                len: self.store.len(),
            });
        };
        self.store.move_to(target)?;
        Ok(target)
    }

    /// Step forward one beat. Returns the new cursor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> StoryResult<usize> {
        let target = self.store.current_index() + 1;
        self.store.move_to(target)?;
        Ok(target)
    }

    /// Jump to any generated step. Returns the new cursor.
    pub fn go_to(&mut self, index: usize) -> StoryResult<usize> {
        self.store.move_to(index)?;
        Ok(index)
    }
}

/// What a front end shows for one step.
///
/// Only the current step exposes live choices; every other step is frozen
/// and shows at most the choice that was made on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView<'a> {
    /// Position of the step in the history.
    pub index: usize,
    /// Number of steps in the history.
    pub total: usize,
    /// Narrative text.
    pub story_text: &'a str,
    /// Choices the player can act on right now.
    pub live_choices: &'a [Choice],
    /// The choice already made on this step.
    pub selected_choice: Option<&'a Choice>,
}

impl<'a> StepView<'a> {
    /// View the step at `index`, or `None` if it has not been generated.
    pub fn of(store: &'a StepStore, index: usize) -> Option<Self> {
        store.get(index).map(|step| Self::at(store, index, step))
    }

    /// View the current step.
    pub fn current(store: &'a StepStore) -> Self {
        Self::at(store, store.current_index(), store.current_step())
    }

    fn at(store: &'a StepStore, index: usize, step: &'a Step) -> Self {
        let live = index == store.current_index() && !step.is_answered();
        Self {
            index,
            total: store.len(),
            story_text: &step.story_text,
            live_choices: if live { &step.choices } else { &[] },
            selected_choice: step.selected_choice.as_ref(),
        }
    }

    /// Whether an earlier step exists.
    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    /// Whether a later step exists.
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total
    }
}
