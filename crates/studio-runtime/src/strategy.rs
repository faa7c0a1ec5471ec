//! Answer strategies with a declared fallback.
//!
//! A stage that answers with tools describes a primary strategy and, when it
//! has one, a plain-prompt fallback. The fallback runs only when the primary
//! fails for a tool-related reason; provider errors and rate limits
//! propagate.

use studio_core::Result;
use studio_llm::ChatModel;
use tracing::{debug, warn};

use crate::agent_loop::run_tool_loop;
use crate::tools::ToolSet;

/// How a stage turns a prompt into answer text.
pub enum AnswerStrategy<'a> {
    /// Bounded tool-calling loop.
    ToolLoop {
        system: Option<String>,
        prompt: String,
        tools: &'a ToolSet,
        max_steps: usize,
    },
    /// One plain prompt, no tools.
    Direct { prompt: String },
}

impl<'a> AnswerStrategy<'a> {
    pub fn tool_loop(prompt: impl Into<String>, tools: &'a ToolSet, max_steps: usize) -> Self {
        AnswerStrategy::ToolLoop {
            system: None,
            prompt: prompt.into(),
            tools,
            max_steps,
        }
    }

    pub fn direct(prompt: impl Into<String>) -> Self {
        AnswerStrategy::Direct {
            prompt: prompt.into(),
        }
    }

    /// Attach a system prompt to a tool loop. No-op for direct prompting.
    pub fn with_system(mut self, text: impl Into<String>) -> Self {
        if let AnswerStrategy::ToolLoop { ref mut system, .. } = self {
            *system = Some(text.into());
        }
        self
    }

    fn has_no_tools(&self) -> bool {
        matches!(self, AnswerStrategy::ToolLoop { tools, .. } if tools.is_empty())
    }

    async fn run(&self, model: &ChatModel) -> Result<String> {
        match self {
            AnswerStrategy::ToolLoop {
                system,
                prompt,
                tools,
                max_steps,
            } => run_tool_loop(model, system.as_deref(), prompt, tools, *max_steps).await,
            AnswerStrategy::Direct { prompt } => model.invoke(prompt).await,
        }
    }
}

/// A primary strategy and an optional fallback.
pub struct StrategyPlan<'a> {
    primary: AnswerStrategy<'a>,
    fallback: Option<AnswerStrategy<'a>>,
}

impl<'a> StrategyPlan<'a> {
    pub fn new(primary: AnswerStrategy<'a>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: AnswerStrategy<'a>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Run the plan. A tool loop with no tools goes straight to the fallback
    /// when there is one, and otherwise prompts once with no tools.
    pub async fn execute(self, model: &ChatModel, stage: &str) -> Result<String> {
        if self.primary.has_no_tools() {
            if let Some(fallback) = self.fallback {
                debug!(stage, "no tools available, prompting directly");
                return fallback.run(model).await;
            }
        }

        match self.primary.run(model).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_tool_failure() => match self.fallback {
                Some(fallback) => {
                    warn!(stage, error = %e, "tool strategy failed, using plain prompt");
                    fallback.run(model).await
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use studio_core::StudioError;
    use studio_core::Tool;
    use studio_llm::{MockError, MockProvider, MockResponse};

    struct Noop;

    #[async_trait::async_trait]
    impl Tool for Noop {
        fn name(&self) -> &str {
            "noop"
        }
        fn description(&self) -> &str {
            "Does nothing"
        }
        async fn call(&self, _input: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn one_tool() -> ToolSet {
        ToolSet::new(vec![Arc::new(Noop)])
    }

    #[tokio::test]
    async fn test_fallback_on_tool_failure() {
        let mock = Arc::new(
            MockProvider::new("mock")
                .with_mock_response(MockResponse::error(MockError::ToolCalling("bad schema".into())))
                .with_response("plain answer"),
        );
        let model = ChatModel::new(mock.clone(), "m");
        let tools = one_tool();

        let out = StrategyPlan::new(AnswerStrategy::tool_loop("q", &tools, 3))
            .with_fallback(AnswerStrategy::direct("fallback q"))
            .execute(&model, "test")
            .await
            .unwrap();
        assert_eq!(out, "plain answer");
        assert_eq!(mock.recorded_requests()[1].messages[0].content, "fallback q");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mock = Arc::new(
            MockProvider::new("mock")
                .with_error("HTTP 500: down")
                .with_response("never used"),
        );
        let model = ChatModel::new(mock.clone(), "m");
        let tools = one_tool();

        let err = StrategyPlan::new(AnswerStrategy::tool_loop("q", &tools, 3))
            .with_fallback(AnswerStrategy::direct("fallback q"))
            .execute(&model, "test")
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::LlmProvider(_)));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_tool_set_degrades_to_direct() {
        let mock = Arc::new(MockProvider::new("mock").with_response("direct"));
        let model = ChatModel::new(mock.clone(), "m");
        let tools = ToolSet::default();

        let out = StrategyPlan::new(AnswerStrategy::tool_loop("with tools", &tools, 3))
            .with_fallback(AnswerStrategy::direct("without tools"))
            .execute(&model, "test")
            .await
            .unwrap();
        assert_eq!(out, "direct");
        assert_eq!(mock.recorded_requests()[0].messages[0].content, "without tools");
    }
}
