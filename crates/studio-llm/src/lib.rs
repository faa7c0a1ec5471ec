//! # studio-llm
//!
//! Abstraction over chat-completion providers. Stages talk to a [`ChatModel`],
//! which pins model name and sampling settings on top of an [`LlmProvider`].

pub mod mock;
pub mod model;
pub mod openai;
pub mod provider;

pub use mock::{MockError, MockProvider, MockResponse};
pub use model::ChatModel;
pub use openai::OpenAiProvider;
pub use provider::{LlmProvider, LlmRequest, LlmResponse, StopReason, Usage};
