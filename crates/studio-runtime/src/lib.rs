//! # studio-runtime
//!
//! The orchestration engine. A request enters with a mode, the [`router`]
//! picks a branch, and the [`engine`] runs that branch's fixed stage sequence
//! over one [`RequestState`], merging each stage's partial update before the
//! next stage runs. Every branch ends with the memory-write stage.
//!
//! ```text
//! docs     : memory-read → retrieve → pre-tool-context → answer-generation → write → memory-write
//! video    : memory-read → retrieve → video-precontext → video-chapters
//!            → pre-tool-context → answer-generation → write → memory-write
//! product  : product-builder → write → memory-write
//! research : research-precontext → research-agent → write → memory-write
//! ```

pub mod agent_loop;
pub mod bootstrap;
pub mod context;
pub mod engine;
pub mod prompts;
pub mod retriever;
pub mod router;
pub mod stage;
pub mod stages;
pub mod state;
pub mod strategy;
pub mod tools;

pub use context::{EngineSettings, StageContext};
pub use engine::{Engine, EngineBuilder};
pub use retriever::{InMemoryRetriever, Retriever, chunk_text};
pub use router::{Branch, route};
pub use stage::StageId;
pub use state::{RequestState, StateUpdate};
pub use tools::{ToolRegistry, ToolSet};
pub use tools::web::{HttpWebResearch, SearchHit, WebResearch};
