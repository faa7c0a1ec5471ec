//! # studio-core
//!
//! Shared vocabulary for the studio orchestrator: the error type, request
//! modes, retrieved passages, LLM messages, and the tool abstraction used by
//! every other crate in the workspace.

pub mod error;
pub mod message;
pub mod timestamp;
pub mod tool;
pub mod types;

pub use error::{Result, StudioError};
pub use message::{Message, Role};
pub use tool::{Tool, ToolCall, ToolSpec};
pub use types::*;
