use studio_core::{Mode, Result};

use super::answer::non_empty;
use crate::context::StageContext;
use crate::prompts;
use crate::state::{RequestState, StateUpdate};
use crate::strategy::{AnswerStrategy, StrategyPlan};

/// Plan the research before any web access.
pub async fn precontext(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let plan = ctx.model.invoke(&prompts::research_plan(&state.question)).await?;
    Ok(StateUpdate::new()
        .append_tool_context(format!("[RESEARCH-PLAN]\n{plan}"))
        .research_plan(plan))
}

/// Search, scrape, and answer. Without working tools the answer comes from
/// the model's own knowledge, guided by the plan.
pub async fn agent(ctx: &StageContext, state: &RequestState) -> Result<StateUpdate> {
    let plan = if state.research_plan.trim().is_empty() {
        state.tool_context.as_str()
    } else {
        state.research_plan.as_str()
    };

    let tools = ctx.tools.tools_for_mode(&Mode::Research);
    let answer = StrategyPlan::new(
        AnswerStrategy::tool_loop(
            prompts::research_agent(&state.question),
            tools,
            ctx.settings.research_max_steps,
        )
        .with_system(prompts::RESEARCH_SYSTEM),
    )
    .with_fallback(AnswerStrategy::direct(prompts::research_direct(&state.question, plan)))
    .execute(&ctx.model, "research-agent")
    .await?;

    Ok(StateUpdate::new().intermediate_answer(non_empty(answer)))
}
