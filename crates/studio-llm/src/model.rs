use std::sync::Arc;
use studio_core::{Message, Result, ToolSpec};

use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A provider bound to one model and one set of sampling parameters.
///
/// Cheap to clone; every stage of a run shares the same instance.
#[derive(Clone)]
pub struct ChatModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatModel {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1,
            max_tokens: 2048,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Prompt in, text out.
    pub async fn invoke(&self, prompt: &str) -> Result<String> {
        let response = self.complete(None, vec![Message::user(prompt)], vec![]).await?;
        Ok(response.message.content)
    }

    /// Full completion with an optional system prompt and tool list.
    pub async fn complete(
        &self,
        system: Option<&str>,
        messages: Vec<Message>,
        tools: Vec<ToolSpec>,
    ) -> Result<LlmResponse> {
        let request = LlmRequest {
            model: self.model.clone(),
            messages,
            tools,
            system: system.map(String::from),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        self.provider.complete(&request).await
    }

    pub async fn health_check(&self) -> Result<()> {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[tokio::test]
    async fn test_invoke_sends_single_user_message() {
        let mock = Arc::new(MockProvider::new("mock").with_response("pong"));
        let model = ChatModel::new(mock.clone(), "openai/gpt-oss-20b").with_temperature(0.3);

        assert_eq!(model.invoke("ping").await.unwrap(), "pong");

        let recorded = mock.recorded_requests();
        assert_eq!(recorded[0].model, "openai/gpt-oss-20b");
        assert_eq!(recorded[0].messages.len(), 1);
        assert_eq!(recorded[0].messages[0].content, "ping");
        assert!(recorded[0].tools.is_empty());
        assert_eq!(recorded[0].temperature, 0.3);
    }
}
