//! Error types used throughout the crate.

/// Alias for `Result<T, StoryError>`.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors raised by the story history when a call breaks one of its rules.
///
/// None of these mutate the history: the caller can correct the call and
/// try again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryError {
    /// A choice was recorded against a step that is not the current one.
    #[error("step {index} is not the current step (current is {current})")]
    StaleStep {
        /// The step the caller targeted.
        index: usize,
        /// The step at the cursor.
        current: usize,
    },

    /// The step already has a selected choice.
    #[error("step {0} has already been answered")]
    AlreadyAnswered(usize),

    /// A custom choice was blank after trimming.
    #[error("a custom action cannot be empty")]
    EmptyChoice,

    /// A predefined choice that the current step does not offer.
    #[error("choice {0} is not offered by the current step")]
    NotOffered(i64),

    /// The current step offers no choices: the story is over.
    #[error("the story has ended")]
    StoryEnded,

    /// A cursor move outside the generated steps.
    #[error("step index {index} is out of range (0..{len})")]
    OutOfRange {
        /// The requested index; `-1` when stepping back from the first step.
        index: i64,
        /// Number of steps in the history.
        len: usize,
    },

    /// An append that does not immediately follow a committed choice.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}
