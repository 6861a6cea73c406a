//! Persistent long-term memory store for Hearth.
//!
//! Key facts about the user (category, subject, confidence) live in an
//! embedded SQLite database. The orchestrator writes records when the model
//! signals a memory-worthy fact and injects a compact fact list into the
//! model's system context on each turn.

pub mod db;
pub mod error;
pub mod store;

pub use db::Database;
pub use error::MemoryError;
pub use store::MemoryStore;
