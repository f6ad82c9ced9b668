//! Core types for Taleweaver: the story history and the rules that govern it.
//!
//! A story is an append-only list of [`Step`]s with a movable cursor. This
//! crate owns the list ([`StepStore`]), the validation of user input into a
//! [`Choice`] ([`apply_choice`]), pointer movement ([`Navigator`]), and
//! exporting a finished run ([`Transcript`]). It performs no I/O; talking to
//! the story generator is the job of `tw-session`.

pub mod character;
pub mod choice;
pub mod error;
pub mod navigator;
pub mod step;
pub mod store;
pub mod transcript;

pub use character::{Character, Language};
pub use choice::{CUSTOM_CHOICE_ID, Choice, ChoiceInput, apply_choice};
pub use error::{StoryError, StoryResult};
pub use navigator::{Navigator, StepView};
pub use step::{Step, StoryPayload};
pub use store::StepStore;
pub use transcript::Transcript;
