//! The story generator port and its implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tw_core::{Character, Language, StoryPayload};

use crate::error::GeneratorResult;

pub mod catalog;
pub mod http;
pub mod scripted;

/// What the generator needs to continue the story after a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueRequest {
    /// Id of the chosen action (`-1` for free text).
    pub choice_id: i64,
    /// Text of the chosen action.
    pub choice_text: String,
    /// Story text of the step the choice was made on.
    #[serde(rename = "story_context")]
    pub prior_story_text: String,
    /// Whether the player typed the action.
    pub is_custom: bool,
    /// Language code of the session.
    pub language: String,
}

/// Produces story beats. Treated as an opaque remote collaborator.
///
/// A failed call must not have produced a step; a successful call yields
/// exactly one payload.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate the opening beat for `character`.
    async fn start_story(
        &self,
        character: &Character,
        language: &str,
    ) -> GeneratorResult<StoryPayload>;

    /// Generate the beat that follows a choice.
    async fn continue_story(&self, request: &ContinueRequest) -> GeneratorResult<StoryPayload>;
}

/// Lists what the player can pick before a story starts.
#[async_trait]
pub trait StoryCatalog: Send + Sync {
    /// Languages stories can be told in.
    async fn languages(&self) -> GeneratorResult<Vec<Language>>;

    /// Characters available in `language`.
    async fn characters(&self, language: &str) -> GeneratorResult<Vec<Character>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continue_request_wire_format() {
        let request = ContinueRequest {
            choice_id: -1,
            choice_text: "fight".to_string(),
            prior_story_text: "A troll blocks the bridge.".to_string(),
            is_custom: true,
            language: "en".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["choice_id"], -1);
        assert_eq!(json["story_context"], "A troll blocks the bridge.");
        assert_eq!(json["is_custom"], true);
        assert!(json.get("prior_story_text").is_none());
    }
}
