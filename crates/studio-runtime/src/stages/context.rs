use studio_core::{Intent, Mode, Result};
use tracing::debug;

use crate::context::StageContext;
use crate::prompts;
use crate::state::{RequestState, StateUpdate};

/// Docs questions: classify intent, and for code questions add a short
/// framing of what the user needs to the tool context.
pub async fn run(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    if state.mode != Mode::Docs {
        return Ok(StateUpdate::new());
    }

    let label = ctx.model.invoke(&prompts::intent(&state.question)).await?;
    let intent = Intent::from_label(&label);
    debug!(intent = intent.as_str(), "intent classified");

    let mut update = StateUpdate::new().intent(Some(intent));
    if intent == Intent::Code {
        let framing = ctx.model.invoke(&prompts::code_context(&state.question)).await?;
        update = update.append_tool_context(format!("[PRE-CODE-CONTEXT]\n{framing}"));
    }
    Ok(update)
}
