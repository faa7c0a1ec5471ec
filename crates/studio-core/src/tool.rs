use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of a tool as advertised to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema of the parameters object.
    pub parameters: Value,
}

impl ToolSpec {
    /// Every studio tool takes a single free-text `input` argument.
    pub fn single_input(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "input": { "type": "string", "description": "Tool input text" }
                },
                "required": ["input"]
            }),
        }
    }
}

/// A request from the LLM to call a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub tool_name: String,
    pub arguments: Value,
}

impl ToolCall {
    /// The text handed to the tool. Models occasionally send a bare string or
    /// use a different key than `input`, so those shapes are accepted too.
    pub fn input(&self) -> String {
        match &self.arguments {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("input") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => match map.values().next() {
                    Some(Value::String(s)) if map.len() == 1 => s.clone(),
                    _ => self.arguments.to_string(),
                },
            },
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// A named capability `input text -> output text` that an agent loop can call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Human-readable description for the LLM.
    fn description(&self) -> &str;

    async fn call(&self, input: &str) -> crate::Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec::single_input(self.name(), self.description())
    }
}
