use async_trait::async_trait;
use serde_json::{Value, json};
use studio_core::{Message, Result, Role, StudioError, ToolCall};
use tracing::debug;

use crate::provider::*;

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI-compatible chat-completions provider (Groq, OpenAI, vLLM, etc.)
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    provider_name: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GROQ_BASE_URL.into(),
            provider_name: "groq".into(),
        }
    }

    /// Use a custom base URL for another OpenAI-compatible service.
    pub fn with_base_url(mut self, url: String, name: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self.provider_name = name;
        self
    }

    fn request_body(request: &LlmRequest) -> Value {
        let mut messages = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }

        for msg in &request.messages {
            match msg.role {
                Role::System => messages.push(json!({ "role": "system", "content": msg.content })),
                Role::User => messages.push(json!({ "role": "user", "content": msg.content })),
                Role::Assistant if msg.tool_calls.is_empty() => {
                    messages.push(json!({ "role": "assistant", "content": msg.content }));
                }
                Role::Assistant => {
                    let calls: Vec<Value> = msg
                        .tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.tool_name,
                                    "arguments": tc.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                    let content = if msg.content.is_empty() {
                        Value::Null
                    } else {
                        json!(msg.content)
                    };
                    messages.push(json!({
                        "role": "assistant",
                        "content": content,
                        "tool_calls": calls,
                    }));
                }
                Role::Tool => match &msg.tool_call_id {
                    Some(id) => messages.push(json!({
                        "role": "tool",
                        "tool_call_id": id,
                        "content": msg.content,
                    })),
                    // Without a call id the API rejects a tool message.
                    None => messages.push(json!({ "role": "user", "content": msg.content })),
                },
            }
        }

        let mut body = json!({
            "model": &request.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "messages": messages,
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
        }

        body
    }

    fn parse_response(data: &Value) -> LlmResponse {
        let choice = &data["choices"][0];
        let content = choice["message"]["content"].as_str().unwrap_or("").to_string();

        let tool_calls: Vec<ToolCall> = choice["message"]["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|c| {
                        let raw = c["function"]["arguments"].as_str().unwrap_or("{}");
                        Some(ToolCall {
                            id: c["id"].as_str()?.to_string(),
                            tool_name: c["function"]["name"].as_str()?.to_string(),
                            arguments: serde_json::from_str(raw)
                                .unwrap_or_else(|_| Value::String(raw.to_string())),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let has_tool_calls = !tool_calls.is_empty();
        let mut message = Message::assistant(content);
        message.tool_calls = tool_calls;

        let usage = &data["usage"];
        LlmResponse {
            message,
            usage: Usage {
                input_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                output_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
            },
            stop_reason: match choice["finish_reason"].as_str().unwrap_or("") {
                "length" => StopReason::MaxTokens,
                "content_filter" => StopReason::ContentFilter,
                _ if has_tool_calls => StopReason::ToolUse,
                _ => StopReason::EndTurn,
            },
        }
    }
}

/// Map a non-2xx response onto the error taxonomy.
fn classify_failure(
    status: reqwest::StatusCode,
    retry_after: Option<u64>,
    body: &str,
    used_tools: bool,
) -> StudioError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return StudioError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(0),
        };
    }
    if used_tools && status == reqwest::StatusCode::BAD_REQUEST && body.contains("tool") {
        return StudioError::ToolCalling(format!("HTTP {status}: {body}"));
    }
    StudioError::LlmProvider(format!("HTTP {status}: {body}"))
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let body = Self::request_body(request);
        debug!(
            provider = %self.provider_name,
            model = %request.model,
            tools = request.tools.len(),
            "sending chat completion"
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::LlmProvider(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u64);
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, &text, !request.tools.is_empty()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| StudioError::LlmProvider(e.to_string()))?;

        Ok(Self::parse_response(&data))
    }

    async fn health_check(&self) -> Result<()> {
        let resp = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| StudioError::LlmProvider(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(StudioError::LlmProvider(format!("HTTP {}", resp.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::ToolSpec;

    fn request(messages: Vec<Message>, tools: Vec<ToolSpec>) -> LlmRequest {
        LlmRequest {
            model: "openai/gpt-oss-20b".into(),
            messages,
            tools,
            system: Some("be brief".into()),
            max_tokens: 256,
            temperature: 0.1,
        }
    }

    #[test]
    fn test_body_includes_system_and_tools() {
        let req = request(
            vec![Message::user("hi")],
            vec![ToolSpec::single_input("web_search", "Search the web")],
        );
        let body = OpenAiProvider::request_body(&req);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn test_body_encodes_tool_round_trip() {
        let mut assistant = Message::assistant("");
        assistant.tool_calls = vec![ToolCall {
            id: "call_1".into(),
            tool_name: "web_search".into(),
            arguments: json!({"input": "rust"}),
        }];
        let req = request(
            vec![Message::user("q"), assistant, Message::tool_result("call_1", "results")],
            vec![],
        );
        let body = OpenAiProvider::request_body(&req);
        assert!(body.get("tools").is_none());
        assert!(body["messages"][2]["content"].is_null());
        assert_eq!(body["messages"][2]["tool_calls"][0]["function"]["arguments"], "{\"input\":\"rust\"}");
        assert_eq!(body["messages"][3]["role"], "tool");
        assert_eq!(body["messages"][3]["tool_call_id"], "call_1");
    }

    #[test]
    fn test_parse_tool_calls() {
        let data = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "function": { "name": "price_extractor", "arguments": "{\"input\":\"phones\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
        });
        let resp = OpenAiProvider::parse_response(&data);
        assert!(resp.has_tool_calls());
        assert_eq!(resp.stop_reason, StopReason::ToolUse);
        assert_eq!(resp.message.tool_calls[0].input(), "phones");
        assert_eq!(resp.usage.total_tokens(), 15);
    }

    #[test]
    fn test_failure_classification() {
        let limited = classify_failure(reqwest::StatusCode::TOO_MANY_REQUESTS, Some(20), "", false);
        assert!(matches!(limited, StudioError::RateLimited { retry_after_secs: 20 }));

        let tool = classify_failure(
            reqwest::StatusCode::BAD_REQUEST,
            None,
            r#"{"error":{"code":"tool_use_failed"}}"#,
            true,
        );
        assert!(tool.is_tool_failure());

        let plain = classify_failure(reqwest::StatusCode::BAD_REQUEST, None, "tool", false);
        assert!(matches!(plain, StudioError::LlmProvider(_)));
    }
}
