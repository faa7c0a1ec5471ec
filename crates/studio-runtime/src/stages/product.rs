use studio_core::{Category, Mode, Result};

use super::answer::non_empty;
use crate::context::StageContext;
use crate::prompts;
use crate::state::{RequestState, StateUpdate};
use crate::strategy::{AnswerStrategy, StrategyPlan};

/// Lines of earlier product memory carried into the prompt.
const MEMORY_LINES: usize = 2;

/// Draft an MVP blueprint with the product-planning tools.
pub async fn run(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let stored = ctx.memory.get(&state.user_id, Some(Category::Product));
    let lines: Vec<&str> = stored.lines().collect();
    let memory = lines[lines.len().saturating_sub(MEMORY_LINES)..].join("\n");

    let tools = ctx.tools.tools_for_mode(&Mode::Product);
    let blueprint = StrategyPlan::new(AnswerStrategy::tool_loop(
        prompts::product_agent(&state.question, &memory),
        tools,
        ctx.settings.max_tool_steps,
    ))
    .with_fallback(AnswerStrategy::direct(prompts::product_direct(&state.question, &memory)))
    .execute(&ctx.model, "product-builder")
    .await?;

    Ok(StateUpdate::new().intermediate_answer(non_empty(blueprint)))
}
