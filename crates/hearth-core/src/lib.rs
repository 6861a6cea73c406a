//! Core types, configuration, and the root error type for Hearth.
//!
//! Hearth is a self-hosted voice-assistant core. This crate holds the
//! vocabulary shared by every other crate: conversation messages, tool
//! calls and results, memory records, and the TOML configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::HearthConfig;
pub use error::{HearthError, Result};
pub use types::{
    ClientContext, MemoryCategory, MemoryRecord, Message, Role, ToolCall, ToolResult, ToolStatus,
};
