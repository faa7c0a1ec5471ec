//! Mock LLM provider for deterministic testing.
//!
//! Returns pre-configured responses without making any HTTP calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::provider::*;
use studio_core::{Message, Result, StudioError, ToolCall};

/// A mock LLM provider that returns queued responses in order, then a
/// default response once the queue is drained.
///
/// # Example
/// ```
/// use studio_llm::MockProvider;
/// let provider = MockProvider::new("test")
///     .with_response("Hello, world!")
///     .with_default_response("fallback text");
/// ```
pub struct MockProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    default_response: Mutex<MockResponse>,
    /// Every request received, for assertions in tests.
    requests: Mutex<Vec<LlmRequest>>,
    name: String,
}

/// Kind of failure a queued response injects.
#[derive(Clone, Debug)]
pub enum MockError {
    Provider(String),
    RateLimited(u64),
    ToolCalling(String),
}

/// A pre-configured response from the mock provider.
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    /// If set, the provider returns this error instead.
    pub error: Option<MockError>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            text: String::new(),
            tool_calls: vec![],
            stop_reason: StopReason::EndTurn,
            error: None,
        }
    }
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn error(error: MockError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: Mutex::new(MockResponse::text("(mock: no more queued responses)")),
            requests: Mutex::new(vec![]),
            name: name.into(),
        }
    }

    /// Queue a simple text response.
    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().push_back(MockResponse::text(text));
        self
    }

    /// Response returned whenever the queue is empty.
    pub fn with_default_response(self, text: &str) -> Self {
        *self.default_response.lock() = MockResponse::text(text);
        self
    }

    /// Queue a tool call response with a single `input` argument.
    pub fn with_tool_call(self, name: &str, input: &str) -> Self {
        self.responses.lock().push_back(MockResponse {
            tool_calls: vec![ToolCall {
                id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                tool_name: name.to_string(),
                arguments: serde_json::json!({ "input": input }),
            }],
            stop_reason: StopReason::ToolUse,
            ..Default::default()
        });
        self
    }

    /// Queue a generic provider error.
    pub fn with_error(self, error: &str) -> Self {
        self.with_mock_response(MockResponse::error(MockError::Provider(error.to_string())))
    }

    /// Queue a fully custom response.
    pub fn with_mock_response(self, resp: MockResponse) -> Self {
        self.responses.lock().push_back(resp);
        self
    }

    /// All requests made to this provider so far.
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_response.lock().clone())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().push(request.clone());
        let mock = self.next_response();

        if let Some(error) = mock.error {
            return Err(match error {
                MockError::Provider(msg) => StudioError::LlmProvider(msg),
                MockError::RateLimited(secs) => StudioError::RateLimited {
                    retry_after_secs: secs,
                },
                MockError::ToolCalling(msg) => StudioError::ToolCalling(msg),
            });
        }

        let mut message = Message::assistant(mock.text);
        message.tool_calls = mock.tool_calls;

        Ok(LlmResponse {
            message,
            usage: Usage {
                input_tokens: 100,
                output_tokens: 50,
            },
            stop_reason: mock.stop_reason,
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
