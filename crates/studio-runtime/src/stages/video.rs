use studio_core::{Mode, Result};

use crate::context::StageContext;
use crate::prompts;
use crate::state::{RequestState, StateUpdate};
use crate::tools::clip;

/// Passages sent to the chapter prompt.
const CHAPTER_PASSAGES: usize = 10;

/// Short analysis of where in the video the answer likely sits.
pub async fn precontext(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    if state.mode != Mode::Video {
        return Ok(StateUpdate::new());
    }
    let notes = ctx.model.invoke(&prompts::video_precontext(&state.question)).await?;
    Ok(StateUpdate::new().append_tool_context(notes))
}

/// Chapter titles drawn from the retrieved transcript, one per line.
pub async fn chapters(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    if state.mode != Mode::Video {
        return Ok(StateUpdate::new());
    }
    let transcript = state
        .retrieved_passages
        .iter()
        .take(CHAPTER_PASSAGES)
        .map(|p| format!("[{}s] {}", p.timestamp.unwrap_or(0.0), clip(&p.text, 200)))
        .collect::<Vec<_>>()
        .join("\n");

    let reply = ctx.model.invoke(&prompts::video_chapters(&transcript)).await?;
    let chapters = reply
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    Ok(StateUpdate::new().video_chapters(chapters))
}
