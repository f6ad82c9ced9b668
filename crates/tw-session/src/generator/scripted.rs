//! A generator that replays a recorded story.
//!
//! Useful offline and in tests: every request is recorded, and failures can
//! be queued ahead of the next continuation.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tw_core::{Character, Language, StoryPayload};

use super::catalog::{builtin_characters, builtin_languages};
use super::{ContinueRequest, StoryCatalog, StoryGenerator};
use crate::error::{GeneratorError, GeneratorResult};

/// A recorded story: the opening beat and the beats that follow, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryScript {
    /// Returned by every `start_story` call.
    pub opening: StoryPayload,
    /// Returned by successive `continue_story` calls, whatever was chosen.
    #[serde(default)]
    pub continuations: Vec<StoryPayload>,
    /// Languages to offer; the built-in list when absent.
    #[serde(default = "builtin_languages")]
    pub languages: Vec<Language>,
    /// Characters to offer; the built-in list when absent.
    #[serde(default = "builtin_characters")]
    pub characters: Vec<Character>,
}

impl StoryScript {
    /// A script with the built-in catalog.
    pub fn new(opening: StoryPayload, continuations: Vec<StoryPayload>) -> Self {
        Self {
            opening,
            continuations,
            languages: builtin_languages(),
            characters: builtin_characters(),
        }
    }
}

/// A request the scripted generator received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorCall {
    /// `start_story` was called.
    Start {
        /// Name of the character.
        character: String,
        /// Language code.
        language: String,
    },
    /// `continue_story` was called.
    Continue(ContinueRequest),
}

#[derive(Debug, Default)]
struct Playback {
    position: usize,
    failures: VecDeque<GeneratorError>,
    calls: Vec<GeneratorCall>,
}

/// Replays a [`StoryScript`].
///
/// Starting a story rewinds the script, so a restarted session replays it
/// from the top.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: StoryScript,
    playback: Mutex<Playback>,
}

impl ScriptedGenerator {
    /// Replay `script`.
    pub fn new(script: StoryScript) -> Self {
        Self {
            script,
            playback: Mutex::new(Playback::default()),
        }
    }

    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> GeneratorResult<Self> {
        let script: StoryScript =
            serde_json::from_str(json).map_err(|e| GeneratorError::Script(e.to_string()))?;
        Ok(Self::new(script))
    }

    /// Load a JSON script from disk.
    pub fn from_file(path: &Path) -> GeneratorResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| GeneratorError::Script(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Make the next `continue_story` call fail with `error`.
    ///
    /// Queued failures do not consume a continuation.
    pub fn fail_next(&self, error: GeneratorError) {
        self.playback().failures.push_back(error);
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.playback().calls.clone()
    }

    /// Number of `continue_story` calls received so far.
    pub fn continue_calls(&self) -> usize {
        self.playback()
            .calls
            .iter()
            .filter(|c| matches!(c, GeneratorCall::Continue(_)))
            .count()
    }

    fn playback(&self) -> MutexGuard<'_, Playback> {
        self.playback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StoryGenerator for ScriptedGenerator {
    async fn start_story(
        &self,
        character: &Character,
        language: &str,
    ) -> GeneratorResult<StoryPayload> {
        let mut playback = self.playback();
        playback.calls.push(GeneratorCall::Start {
            character: character.name.clone(),
            language: language.to_string(),
        });
        playback.position = 0;
        Ok(self.script.opening.clone())
    }

    async fn continue_story(&self, request: &ContinueRequest) -> GeneratorResult<StoryPayload> {
        let mut playback = self.playback();
        playback.calls.push(GeneratorCall::Continue(request.clone()));

        if let Some(error) = playback.failures.pop_front() {
            return Err(error);
        }

        let payload = self
            .script
            .continuations
            .get(playback.position)
            .cloned()
            .ok_or(GeneratorError::Exhausted(self.script.continuations.len()))?;
        playback.position += 1;
        Ok(payload)
    }
}

#[async_trait]
impl StoryCatalog for ScriptedGenerator {
    async fn languages(&self) -> GeneratorResult<Vec<Language>> {
        Ok(self.script.languages.clone())
    }

    async fn characters(&self, _language: &str) -> GeneratorResult<Vec<Character>> {
        Ok(self.script.characters.clone())
    }
}
