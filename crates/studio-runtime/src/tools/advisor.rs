//! Tools that are a single prompt to the model.

use async_trait::async_trait;
use studio_core::{Result, Tool};
use studio_llm::ChatModel;

use crate::prompts;

/// A named prompt template backed by the shared model.
pub struct PromptTool {
    name: &'static str,
    description: &'static str,
    template: fn(&str) -> String,
    model: ChatModel,
}

impl PromptTool {
    pub fn new(
        name: &'static str,
        description: &'static str,
        template: fn(&str) -> String,
        model: ChatModel,
    ) -> Self {
        Self {
            name,
            description,
            template,
            model,
        }
    }
}

#[async_trait]
impl Tool for PromptTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn call(&self, input: &str) -> Result<String> {
        self.model.invoke(&(self.template)(input)).await
    }
}

pub fn code_explainer(model: ChatModel) -> PromptTool {
    PromptTool::new(
        "code_explainer",
        "Explain source code in plain terms. Input: the code.",
        prompts::explain_code,
        model,
    )
}

/// The product-planning tools, in the order the agent sees them.
pub fn product_tools(model: &ChatModel) -> Vec<PromptTool> {
    vec![
        PromptTool::new(
            "feature_generator",
            "Draft the MVP feature list for a product idea. Input: product description.",
            prompts::features,
            model.clone(),
        ),
        PromptTool::new(
            "user_persona_generator",
            "Describe user personas for a product. Input: product description.",
            prompts::personas,
            model.clone(),
        ),
        PromptTool::new(
            "system_architect",
            "Design the system architecture for a product. Input: requirements or features.",
            prompts::architecture,
            model.clone(),
        ),
        PromptTool::new(
            "competitor_analyzer",
            "Analyze competitors and positioning for a product idea.",
            prompts::competitors,
            model.clone(),
        ),
        PromptTool::new(
            "tech_stack_recommender",
            "Recommend a technology stack for a product. Input: requirements.",
            prompts::tech_stack,
            model.clone(),
        ),
    ]
}
