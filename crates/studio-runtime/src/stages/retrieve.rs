use studio_core::{Mode, Result};
use tracing::debug;

use crate::context::StageContext;
use crate::state::{RequestState, StateUpdate};

/// Fetch passages for docs and video questions.
pub async fn run(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let k = match state.mode {
        Mode::Docs => ctx.settings.docs_k,
        Mode::Video => ctx.settings.video_k,
        _ => return Ok(StateUpdate::new()),
    };
    let passages = ctx.retriever.retrieve(&state.question, k).await?;
    debug!(k, found = passages.len(), "passages retrieved");
    Ok(StateUpdate::new().retrieved_passages(passages))
}
