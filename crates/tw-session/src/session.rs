//! The story session controller.
//!
//! A [`StorySession`] owns the step history of one run and is the only
//! writer that appends to it. Submissions go through an explicit
//! [`SessionState`] machine:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Idle
//!                      ▲   │
//!                 retry│   └──err──▶ Failed ──reset──▶ Idle
//!                      └─────────────┘
//! ```
//!
//! Only one submission can be in flight. Navigation works in every state,
//! because the history lock is never held across the generator call.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tw_core::{
    Character, Choice, ChoiceInput, Navigator, Step, StepStore, StoryError, StoryPayload,
    Transcript, apply_choice,
};
use uuid::Uuid;

use crate::error::{GeneratorError, SessionError, SessionResult};
use crate::generator::{ContinueRequest, StoryGenerator};

/// Unique identifier of a story session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Where a session is in its submission cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for a choice.
    Idle,
    /// A choice was recorded and its continuation is being generated.
    Submitting {
        /// Identifies this submission; responses for older tickets are dropped.
        ticket: u64,
        /// The step the choice was recorded on.
        step: usize,
    },
    /// The last generation failed. The choice stays recorded.
    Failed {
        /// Why the generation failed.
        error: GeneratorError,
        /// The step whose continuation failed.
        step: usize,
    },
}

impl SessionState {
    /// Whether a choice can be submitted right now.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a generation is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }
}

/// A copy of a session's history and state, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// All steps, oldest first.
    pub steps: Vec<Step>,
    /// The displayed step.
    pub current_index: usize,
    /// The submission state.
    pub state: SessionState,
}

struct Inner {
    store: StepStore,
    state: SessionState,
    next_ticket: u64,
}

/// One run of a story for a character in a language.
///
/// Created by [`StorySession::start`] once the opening beat has been
/// generated; dropped when the player restarts.
pub struct StorySession {
    id: SessionId,
    character: Character,
    language: String,
    generator: Arc<dyn StoryGenerator>,
    inner: Mutex<Inner>,
}

impl fmt::Debug for StorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorySession")
            .field("id", &self.id)
            .field("character", &self.character.name)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl StorySession {
    /// Generate the opening beat and start a session on it.
    ///
    /// If the generator fails there is no session.
    pub async fn start(
        generator: Arc<dyn StoryGenerator>,
        character: Character,
        language: impl Into<String>,
    ) -> SessionResult<Self> {
        let language = language.into();
        let id = SessionId::new();
        info!(session_id = %id, character = %character.name, %language, "starting story");

        let opening = generator
            .start_story(&character, &language)
            .await
            .and_then(well_formed)
            .inspect_err(|e| warn!(session_id = %id, error = %e, "opening failed"))?;

        Ok(Self {
            id,
            character,
            language,
            generator,
            inner: Mutex::new(Inner {
                store: StepStore::new(opening.into()),
                state: SessionState::Idle,
                next_ticket: 0,
            }),
        })
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The protagonist.
    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Language code the story is told in.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Current submission state.
    pub fn state(&self) -> SessionState {
        self.inner().state.clone()
    }

    /// Index of the displayed step.
    pub fn current_index(&self) -> usize {
        self.inner().store.current_index()
    }

    /// Number of generated steps.
    pub fn len(&self) -> usize {
        self.inner().store.len()
    }

    /// Always false: a session starts with its opening step.
    pub fn is_empty(&self) -> bool {
        self.inner().store.is_empty()
    }

    /// Copy out the history and state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner();
        SessionSnapshot {
            steps: inner.store.steps().to_vec(),
            current_index: inner.store.current_index(),
            state: inner.state.clone(),
        }
    }

    /// Run `f` against the history without copying it.
    ///
    /// `f` must not call back into the session.
    pub fn with_store<R>(&self, f: impl FnOnce(&StepStore) -> R) -> R {
        f(&self.inner().store)
    }

    /// Capture the history for export.
    pub fn transcript(&self) -> Transcript {
        Transcript::new(
            self.character.clone(),
            self.language.clone(),
            self.inner().store.steps(),
        )
    }

    /// Show the previous step.
    pub fn prev(&self) -> SessionResult<usize> {
        Ok(Navigator::new(&mut self.inner().store).prev()?)
    }

    /// Show the next step.
    pub fn next(&self) -> SessionResult<usize> {
        Ok(Navigator::new(&mut self.inner().store).next()?)
    }

    /// Show the step at `index`.
    pub fn go_to(&self, index: usize) -> SessionResult<usize> {
        Ok(Navigator::new(&mut self.inner().store).go_to(index)?)
    }

    /// Validate raw input against the current step and submit it.
    pub async fn submit(&self, input: ChoiceInput) -> SessionResult<()> {
        let (ticket, request) = self.begin(input)?;
        self.complete(ticket, request).await
    }

    /// Submit a choice for the current step.
    ///
    /// Custom choices are trimmed and must not be blank; predefined ones must
    /// be among those the step offers. Records the choice, asks the
    /// generator to continue, and on success appends the new step and shows
    /// it. A rejected choice never reaches the generator. A generator
    /// failure leaves the choice recorded and the session
    /// [`Failed`](SessionState::Failed) until [`reset`](Self::reset).
    pub async fn submit_choice(&self, choice: Choice) -> SessionResult<()> {
        let input = if choice.is_custom {
            ChoiceInput::Custom(choice.text)
        } else {
            ChoiceInput::Predefined(choice)
        };
        self.submit(input).await
    }

    /// Ask the generator again for the step whose continuation failed,
    /// reusing the choice already recorded on it.
    ///
    /// Only legal while [`Failed`](SessionState::Failed). Nothing is retried
    /// unless the caller asks.
    pub async fn retry(&self) -> SessionResult<()> {
        let (ticket, request) = self.begin_retry()?;
        self.complete(ticket, request).await
    }

    /// Clear a failure so a new choice can be submitted.
    ///
    /// A no-op when idle; refused while a submission is in flight.
    pub fn reset(&self) -> SessionResult<()> {
        let mut inner = self.inner();
        match inner.state {
            SessionState::Submitting { .. } => Err(SessionError::Busy),
            SessionState::Idle => Ok(()),
            SessionState::Failed { .. } => {
                debug!(session_id = %self.id, "failed -> idle");
                inner.state = SessionState::Idle;
                Ok(())
            }
        }
    }

    /// Fail the in-flight submission, e.g. when the caller's deadline passes.
    ///
    /// The generator call keeps running; whatever it returns is discarded.
    /// Returns whether a submission was pending.
    pub fn fail_pending(&self, reason: impl Into<String>) -> bool {
        let mut inner = self.inner();
        let SessionState::Submitting { step, .. } = inner.state else {
            return false;
        };
        let error = GeneratorError::TimedOut(reason.into());
        warn!(session_id = %self.id, error = %error, "submission failed by caller");
        inner.state = SessionState::Failed { error, step };
        true
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the choice on the current step and move to `Submitting`.
    fn begin(&self, input: ChoiceInput) -> SessionResult<(u64, ContinueRequest)> {
        let mut inner = self.inner();
        if !inner.state.is_idle() {
            return Err(SessionError::Busy);
        }

        let index = inner.store.current_index();
        let step = inner.store.current_step();
        if step.is_answered() {
            return Err(StoryError::AlreadyAnswered(index).into());
        }
        let choice = apply_choice(step, input)?;
        let prior_story_text = step.story_text.clone();
        inner.store.set_selected_choice(index, choice.clone())?;

        Ok(self.submitting(&mut inner, index, choice, prior_story_text))
    }

    /// Move `Failed` back to `Submitting` with the recorded choice.
    fn begin_retry(&self) -> SessionResult<(u64, ContinueRequest)> {
        let mut inner = self.inner();
        let index = match inner.state {
            SessionState::Failed { step, .. } => step,
            SessionState::Submitting { .. } => return Err(SessionError::Busy),
            SessionState::Idle => return Err(SessionError::NothingToRetry),
        };
        let Some(step) = inner.store.get(index) else {
            return Err(SessionError::NothingToRetry);
        };
        let Some(choice) = step.selected_choice.clone() else {
            return Err(SessionError::NothingToRetry);
        };
        let prior_story_text = step.story_text.clone();

        debug!(session_id = %self.id, step = index, "retrying failed submission");
        Ok(self.submitting(&mut inner, index, choice, prior_story_text))
    }

    fn submitting(
        &self,
        inner: &mut Inner,
        step: usize,
        choice: Choice,
        prior_story_text: String,
    ) -> (u64, ContinueRequest) {
        let ticket = inner.next_ticket;
        inner.next_ticket += 1;
        inner.state = SessionState::Submitting { ticket, step };
        debug!(session_id = %self.id, step, choice_id = choice.id, ticket, "-> submitting");

        (
            ticket,
            ContinueRequest {
                choice_id: choice.id,
                choice_text: choice.text,
                prior_story_text,
                is_custom: choice.is_custom,
                language: self.language.clone(),
            },
        )
    }

    /// Wait for the generator and apply its answer.
    async fn complete(&self, ticket: u64, request: ContinueRequest) -> SessionResult<()> {
        let result = self
            .generator
            .continue_story(&request)
            .await
            .and_then(well_formed);

        let mut inner = self.inner();
        let step = match inner.state {
            SessionState::Submitting { ticket: t, step } if t == ticket => step,
            _ => {
                debug!(session_id = %self.id, ticket, "discarding response for abandoned submission");
                return Err(SessionError::Abandoned);
            }
        };

        match result {
            Ok(payload) => {
                inner.state = SessionState::Idle;
                inner.store.move_to(step)?;
                let next = inner.store.append(payload.into())?;
                inner.store.move_to(next)?;
                info!(session_id = %self.id, step = next, "story continued");
                Ok(())
            }
            Err(error) => {
                warn!(session_id = %self.id, step, error = %error, "submitting -> failed");
                inner.state = SessionState::Failed {
                    error: error.clone(),
                    step,
                };
                Err(error.into())
            }
        }
    }
}

fn well_formed(payload: StoryPayload) -> Result<StoryPayload, GeneratorError> {
    if payload.story_text.trim().is_empty() {
        return Err(GeneratorError::InvalidResponse(
            "story text is empty".to_string(),
        ));
    }
    Ok(payload)
}
