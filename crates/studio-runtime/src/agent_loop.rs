//! Bounded tool-calling loop: ask the model, run the tools it requests, feed
//! the results back, and stop at the first reply with no tool calls.

use studio_core::{Message, Result, StudioError};
use studio_llm::ChatModel;
use tracing::debug;

use crate::tools::ToolSet;

/// Run the loop for at most `max_steps` model calls.
///
/// Errors:
/// - the model names a tool outside `tools` → `ToolNotFound`
/// - a tool fails → `ToolExecution` (rate limits pass through unchanged)
/// - no final reply within `max_steps` → `ToolLoopExhausted`
pub async fn run_tool_loop(
    model: &ChatModel,
    system: Option<&str>,
    prompt: &str,
    tools: &ToolSet,
    max_steps: usize,
) -> Result<String> {
    let specs = tools.specs();
    let mut messages = vec![Message::user(prompt)];

    for step in 1..=max_steps {
        let response = model.complete(system, messages.clone(), specs.clone()).await?;
        if !response.has_tool_calls() {
            debug!(step, "tool loop finished");
            return Ok(response.message.content);
        }

        let calls = response.message.tool_calls.clone();
        messages.push(response.message);

        for call in &calls {
            let tool = tools
                .get(&call.tool_name)
                .ok_or_else(|| StudioError::ToolNotFound(call.tool_name.clone()))?;
            let input = call.input();
            debug!(step, tool = %call.tool_name, input_chars = input.len(), "calling tool");

            let output = tool.call(&input).await.map_err(|e| {
                if e.is_rate_limited() || e.is_tool_failure() {
                    e
                } else {
                    StudioError::ToolExecution {
                        tool: call.tool_name.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;
            messages.push(Message::tool_result(&call.id, output));
        }
    }

    Err(StudioError::ToolLoopExhausted { steps: max_steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use studio_core::Tool;
    use studio_llm::MockProvider;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the input"
        }
        async fn call(&self, input: &str) -> Result<String> {
            Ok(format!("echo: {input}"))
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        async fn call(&self, _input: &str) -> Result<String> {
            Err(StudioError::Retrieval("index offline".into()))
        }
    }

    fn tools() -> ToolSet {
        ToolSet::new(vec![Arc::new(Echo), Arc::new(Broken)])
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let mock = Arc::new(
            MockProvider::new("mock")
                .with_tool_call("echo", "hi")
                .with_response("done"),
        );
        let model = ChatModel::new(mock.clone(), "m");

        let out = run_tool_loop(&model, Some("sys"), "question", &tools(), 4).await.unwrap();
        assert_eq!(out, "done");

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), 2);
        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.content, "echo: hi");
        assert_eq!(last.tool_call_id.as_deref(), Some(requests[1].messages[1].tool_calls[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let model = ChatModel::new(Arc::new(MockProvider::new("mock").with_tool_call("nope", "x")), "m");
        let err = run_tool_loop(&model, None, "q", &tools(), 4).await.unwrap_err();
        assert!(matches!(err, StudioError::ToolNotFound(ref name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_execution_failure() {
        let model = ChatModel::new(Arc::new(MockProvider::new("mock").with_tool_call("broken", "x")), "m");
        let err = run_tool_loop(&model, None, "q", &tools(), 4).await.unwrap_err();
        assert!(matches!(err, StudioError::ToolExecution { ref tool, .. } if tool == "broken"));
        assert!(err.is_tool_failure());
    }

    #[tokio::test]
    async fn test_step_bound() {
        let model = ChatModel::new(
            Arc::new(
                MockProvider::new("mock")
                    .with_tool_call("echo", "1")
                    .with_tool_call("echo", "2")
                    .with_tool_call("echo", "3"),
            ),
            "m",
        );
        let err = run_tool_loop(&model, None, "q", &tools(), 2).await.unwrap_err();
        assert!(matches!(err, StudioError::ToolLoopExhausted { steps: 2 }));
    }
}
