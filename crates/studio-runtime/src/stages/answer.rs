use studio_core::{Mode, Result};

use super::doc_blocks;
use crate::context::StageContext;
use crate::prompts;
use crate::state::{RequestState, StateUpdate};
use crate::strategy::{AnswerStrategy, StrategyPlan};
use crate::tools::clip;

const VIDEO_PASSAGES: usize = 15;
const VIDEO_TRANSCRIPT_CHARS: usize = 3000;
const DOCS_PASSAGES: usize = 6;

pub(crate) const EMPTY_ANSWER: &str = "Could not generate answer.";

/// Draft an answer for docs and video questions: a tool loop over the
/// mode's tools, falling back to a plain prompt over the retrieved passages.
pub async fn run(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let tools = ctx.tools.tools_for_mode(&state.mode);
    let steps = ctx.settings.max_tool_steps;

    let plan = if state.mode == Mode::Video {
        let transcript = state
            .retrieved_passages
            .iter()
            .take(VIDEO_PASSAGES)
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let transcript = clip(&transcript, VIDEO_TRANSCRIPT_CHARS);
        StrategyPlan::new(AnswerStrategy::tool_loop(
            prompts::video_agent(&state.question, transcript),
            tools,
            steps,
        ))
        .with_fallback(AnswerStrategy::direct(prompts::video_direct(&state.question, transcript)))
    } else {
        let memory = state.memory_snippet_loaded.as_deref().unwrap_or("");
        let docs = doc_blocks(&state.retrieved_passages, DOCS_PASSAGES);
        StrategyPlan::new(AnswerStrategy::tool_loop(
            prompts::docs_agent(&state.question, memory, &state.tool_context, &docs),
            tools,
            steps,
        ))
        .with_fallback(AnswerStrategy::direct(prompts::docs_direct(
            &state.question,
            memory,
            &state.tool_context,
            &docs,
        )))
    };

    let answer = plan.execute(&ctx.model, "answer-generation").await?;
    Ok(StateUpdate::new().intermediate_answer(non_empty(answer)))
}

pub(crate) fn non_empty(answer: String) -> String {
    if answer.trim().is_empty() {
        EMPTY_ANSWER.to_string()
    } else {
        answer
    }
}
