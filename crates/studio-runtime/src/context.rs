use std::sync::Arc;

use studio_config::StudioConfig;
use studio_llm::ChatModel;
use studio_memory::MemoryStore;

use crate::retriever::Retriever;
use crate::tools::ToolRegistry;

/// Numeric knobs the stages read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Passages retrieved for docs questions.
    pub docs_k: usize,
    /// Passages retrieved for video questions.
    pub video_k: usize,
    /// Tool-loop bound for docs, video, and product answers.
    pub max_tool_steps: usize,
    /// Tool-loop bound for the research agent.
    pub research_max_steps: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            docs_k: 4,
            video_k: 15,
            max_tool_steps: 6,
            research_max_steps: 15,
        }
    }
}

impl From<&StudioConfig> for EngineSettings {
    fn from(config: &StudioConfig) -> Self {
        Self {
            docs_k: config.retrieval.docs_k,
            video_k: config.retrieval.video_k,
            max_tool_steps: config.agent.max_tool_steps,
            research_max_steps: config.agent.research_max_steps,
        }
    }
}

/// Collaborators shared by every stage. Built once per engine.
pub struct StageContext {
    pub model: ChatModel,
    pub retriever: Arc<dyn Retriever>,
    pub memory: Arc<MemoryStore>,
    pub tools: ToolRegistry,
    pub settings: EngineSettings,
}
