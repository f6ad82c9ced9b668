//! Error types for story sessions and generators.

use thiserror::Error;
use tw_core::StoryError;

/// Result type for generator calls.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures of the story generator. Any of these means no step was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The request never got a response (connection refused, reset, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The generator answered with a non-success status.
    #[error("generator returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response could not be turned into a step.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request or the caller's deadline ran out.
    #[error("timed out: {0}")]
    TimedOut(String),

    /// A scripted story has no more continuations.
    #[error("script exhausted after {0} continuations")]
    Exhausted(usize),

    /// A story script could not be loaded.
    #[error("invalid story script: {0}")]
    Script(String),
}

/// Errors returned by [`StorySession`](crate::StorySession) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A submission is already in flight.
    #[error("a story step is already being generated")]
    Busy,

    /// The submission was failed by the caller before the generator answered;
    /// its response was discarded.
    #[error("the submission was abandoned before the generator answered")]
    Abandoned,

    /// There is no failed submission to retry.
    #[error("nothing to retry")]
    NothingToRetry,

    /// The story history rejected the call.
    #[error(transparent)]
    Story(#[from] StoryError),

    /// The generator failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
