use studio_core::{Category, Mode, Result};
use tracing::{debug, info, warn};

use crate::context::StageContext;
use crate::state::{RequestState, StateUpdate};

/// Load the user's top memories. Video runs never see memory.
pub async fn read(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    if state.mode == Mode::Video {
        return Ok(StateUpdate::new().memory_snippet_loaded(None));
    }
    let loaded = ctx.memory.get(&state.user_id, None);
    debug!(user = %state.user_id, chars = loaded.len(), "memory loaded");
    Ok(StateUpdate::new().memory_snippet_loaded((!loaded.is_empty()).then_some(loaded)))
}

/// Persist the snippet the writer proposed, tagged with the run's mode.
///
/// A store failure is logged and does not fail the run; the answer is
/// already final at this point.
pub async fn write(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let Some(snippet) = state
        .memory_snippet_to_save
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Ok(StateUpdate::new());
    };

    let category = Category::from(&state.mode);
    match ctx.memory.save(&state.user_id, snippet, category, None) {
        Ok(true) => info!(user = %state.user_id, %category, "memory snippet stored"),
        Ok(false) => debug!(user = %state.user_id, "memory snippet rejected"),
        Err(e) => warn!(user = %state.user_id, error = %e, "failed to store memory snippet"),
    }
    Ok(StateUpdate::new())
}
