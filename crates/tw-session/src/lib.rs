//! Story sessions for Taleweaver.
//!
//! A [`StorySession`] drives one run of a story: it asks a
//! [`StoryGenerator`] for the opening, records the player's choices, asks
//! for each continuation, and lets the player page through what has been
//! generated so far. At most one generation is in flight per session.
//!
//! Two generators ship with the crate: [`HttpStoryGenerator`] talks to the
//! story backend over HTTP, and [`ScriptedGenerator`] replays a recorded
//! story offline.

pub mod config;
pub mod error;
pub mod generator;
pub mod session;

pub use config::ClientConfig;
pub use error::{GeneratorError, GeneratorResult, SessionError, SessionResult};
pub use generator::http::HttpStoryGenerator;
pub use generator::scripted::{GeneratorCall, ScriptedGenerator, StoryScript};
pub use generator::{ContinueRequest, StoryCatalog, StoryGenerator};
pub use session::{SessionId, SessionSnapshot, SessionState, StorySession};
