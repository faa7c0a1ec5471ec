//! # studio-memory
//!
//! Durable per-user state shared across runs:
//!
//! - **Memory store**: scored, deduplicated facts about a user, bounded to the
//!   ten most salient, persisted as a single JSON document.
//! - **Session store**: append-only chat logs, one JSON file per session under
//!   a per-user directory.
//!
//! Both stores serialize every read-modify-write behind one lock per instance,
//! so concurrent runs for the same user cannot lose updates.

pub mod session;
pub mod snippet;
pub mod store;

pub use session::{ChatMessage, ChatRole, ChatSession, SessionStore, SessionSummary};
pub use snippet::{
    MAX_MEMORIES_PER_USER, MIN_SCORE_THRESHOLD, MemorySnippet, content_hash, score_content,
    token_overlap,
};
pub use store::{MemoryStats, MemoryStore};
