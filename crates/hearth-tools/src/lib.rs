//! Tool registry and executor for Hearth.
//!
//! Maps tool names either to local handlers (executed synchronously on the
//! server) or to remote-delegation markers (the chat response carries a
//! tool request the client must execute and return). A misbehaving tool
//! never crashes the orchestration loop: every failure becomes an error
//! `ToolResult` fed back to the model.

pub mod error;
pub mod handler;
pub mod registry;

pub use error::ToolError;
pub use handler::ToolHandler;
pub use registry::{RemoteTool, ToolRegistry};
