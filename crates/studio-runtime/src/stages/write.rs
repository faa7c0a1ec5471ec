use serde::Deserialize;
use studio_core::{Mode, Result};
use tracing::debug;

use crate::context::StageContext;
use crate::prompts;
use crate::state::{RequestState, StateUpdate};
use crate::tools::clip;

#[derive(Debug, Deserialize)]
struct WriterReply {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    memory_to_save: Option<String>,
}

/// Finalize the answer and propose a memory snippet.
///
/// - video: the draft passes through; nothing is remembered
/// - product: the draft passes through; the idea itself is remembered
/// - docs, research: the model polishes the draft and suggests a snippet
pub async fn run(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let draft = state.intermediate_answer.clone();
    match state.mode {
        Mode::Video => Ok(StateUpdate::new().answer(draft).memory_snippet_to_save(None)),
        Mode::Product => {
            let snippet = format!("Built MVP for: {}", clip(&state.question, 100));
            Ok(StateUpdate::new().answer(draft).memory_snippet_to_save(Some(snippet)))
        }
        _ => {
            let memory = state.memory_snippet_loaded.as_deref().unwrap_or("");
            let raw = ctx.model.invoke(&prompts::writer(&state.mode, &draft, memory)).await?;
            let Some(reply) = parse_reply(&raw) else {
                debug!("writer reply is not JSON, keeping the draft");
                return Ok(StateUpdate::new().answer(draft).memory_snippet_to_save(None));
            };
            let answer = reply
                .answer
                .filter(|a| !a.trim().is_empty())
                .unwrap_or(draft);
            let snippet = reply
                .memory_to_save
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Ok(StateUpdate::new().answer(answer).memory_snippet_to_save(snippet))
        }
    }
}

/// Models sometimes wrap JSON in prose or code fences; fall back to the
/// outermost braces.
fn parse_reply(raw: &str) -> Option<WriterReply> {
    let trimmed = raw.trim();
    if let Ok(reply) = serde_json::from_str(trimmed) {
        return Some(reply);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let reply = parse_reply(r#"{"answer": "A", "memory_to_save": "likes Rust"}"#).unwrap();
        assert_eq!(reply.answer.as_deref(), Some("A"));
        assert_eq!(reply.memory_to_save.as_deref(), Some("likes Rust"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "Here you go:\n```json\n{\"answer\": \"B\", \"memory_to_save\": \"\"}\n```";
        let reply = parse_reply(raw).unwrap();
        assert_eq!(reply.answer.as_deref(), Some("B"));
        assert_eq!(reply.memory_to_save.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_missing_fields_and_garbage() {
        let reply = parse_reply(r#"{"memory_to_save": null}"#).unwrap();
        assert!(reply.answer.is_none());
        assert!(reply.memory_to_save.is_none());
        assert!(parse_reply("not json at all").is_none());
        assert!(parse_reply("} backwards {").is_none());
    }
}
