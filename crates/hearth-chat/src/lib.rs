//! Conversational orchestration for Hearth.
//!
//! The chat engine receives a user utterance, decides whether to offer
//! tools, calls the model gateway, executes requested tools (locally or by
//! delegating to the client), loops until a final textual answer, and
//! optionally synthesizes speech for the reply.

pub mod engine;
pub mod error;
pub mod intent;
pub mod session;

pub use engine::{ChatEngine, EngineConfig, ReplySource, RespondOptions, TurnOutcome};
pub use error::ChatError;
pub use intent::ToolIntentClassifier;
pub use session::{SessionLimits, SessionStore};
