//! Mode-scoped tool sets.
//!
//! Each mode gets a fixed set of tools the answer loop may call:
//!
//! | mode     | tools |
//! |----------|-------|
//! | docs     | corpus_retriever, wikipedia, code_explainer |
//! | video    | transcript_search, timestamp_lookup, video_summarizer, chapter_search |
//! | product  | feature_generator, user_persona_generator, system_architect, competitor_analyzer, tech_stack_recommender, web_search |
//! | research | web_search, web_scrape, price_extractor |

pub mod advisor;
pub mod corpus;
pub mod web;

use std::sync::Arc;
use studio_core::{Mode, Tool, ToolSpec};
use studio_llm::ChatModel;

use crate::retriever::Retriever;
use web::WebResearch;

/// An ordered collection of tools handed to one tool loop.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Tool sets for every mode, built once per engine.
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    docs: ToolSet,
    video: ToolSet,
    product: ToolSet,
    research: ToolSet,
}

impl ToolRegistry {
    pub fn new(model: ChatModel, retriever: Arc<dyn Retriever>, web: Arc<dyn WebResearch>) -> Self {
        let docs = ToolSet::new(vec![
            Arc::new(corpus::CorpusRetrieverTool::new(retriever.clone())),
            Arc::new(web::WikipediaTool::new(web.clone())),
            Arc::new(advisor::code_explainer(model.clone())),
        ]);
        let video = ToolSet::new(vec![
            Arc::new(corpus::TranscriptSearchTool::new(retriever.clone())),
            Arc::new(corpus::TimestampLookupTool::new(retriever.clone())),
            Arc::new(corpus::VideoSummarizerTool::new(retriever.clone(), model.clone())),
            Arc::new(corpus::ChapterSearchTool::new(retriever)),
        ]);
        let mut product: Vec<Arc<dyn Tool>> = advisor::product_tools(&model)
            .into_iter()
            .map(|t| Arc::new(t) as Arc<dyn Tool>)
            .collect();
        product.push(Arc::new(web::WebSearchTool::new(web.clone())));
        let research = ToolSet::new(vec![
            Arc::new(web::WebSearchTool::new(web.clone())),
            Arc::new(web::WebScrapeTool::new(web)),
            Arc::new(web::PriceExtractorTool),
        ]);

        Self {
            docs,
            video,
            product: ToolSet::new(product),
            research,
        }
    }

    /// Unrecognized modes get the docs tools.
    pub fn tools_for_mode(&self, mode: &Mode) -> &ToolSet {
        match mode {
            Mode::Video => &self.video,
            Mode::Product => &self.product,
            Mode::Research => &self.research,
            Mode::Docs | Mode::Unrecognized(_) => &self.docs,
        }
    }

    /// Replace one mode's tools.
    pub fn with_tools(mut self, mode: &Mode, tools: ToolSet) -> Self {
        match mode {
            Mode::Video => self.video = tools,
            Mode::Product => self.product = tools,
            Mode::Research => self.research = tools,
            Mode::Docs | Mode::Unrecognized(_) => self.docs = tools,
        }
        self
    }
}

/// First `max` characters of `text`.
pub(crate) fn clip(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::InMemoryRetriever;
    use studio_llm::MockProvider;

    struct NoWeb;

    #[async_trait::async_trait]
    impl WebResearch for NoWeb {
        async fn search(&self, _query: &str) -> studio_core::Result<Vec<web::SearchHit>> {
            Ok(vec![])
        }
        async fn scrape(&self, _url: &str) -> studio_core::Result<String> {
            Ok(String::new())
        }
        async fn wikipedia(&self, _query: &str) -> studio_core::Result<String> {
            Ok(String::new())
        }
    }

    fn registry() -> ToolRegistry {
        let model = ChatModel::new(Arc::new(MockProvider::new("mock")), "m");
        ToolRegistry::new(model, Arc::new(InMemoryRetriever::default()), Arc::new(NoWeb))
    }

    #[test]
    fn test_mode_tool_names() {
        let reg = registry();
        assert_eq!(
            reg.tools_for_mode(&Mode::Docs).names(),
            vec!["corpus_retriever", "wikipedia", "code_explainer"]
        );
        assert_eq!(
            reg.tools_for_mode(&Mode::Video).names(),
            vec!["transcript_search", "timestamp_lookup", "video_summarizer", "chapter_search"]
        );
        assert_eq!(
            reg.tools_for_mode(&Mode::Product).names(),
            vec![
                "feature_generator",
                "user_persona_generator",
                "system_architect",
                "competitor_analyzer",
                "tech_stack_recommender",
                "web_search"
            ]
        );
        assert_eq!(
            reg.tools_for_mode(&Mode::Research).names(),
            vec!["web_search", "web_scrape", "price_extractor"]
        );
    }

    #[test]
    fn test_unrecognized_mode_gets_docs_tools() {
        let reg = registry();
        let tools = reg.tools_for_mode(&Mode::from("banana"));
        assert!(tools.get("corpus_retriever").is_some());
    }

    #[test]
    fn test_with_tools_replaces_one_mode() {
        let reg = registry().with_tools(&Mode::Research, ToolSet::default());
        assert!(reg.tools_for_mode(&Mode::Research).is_empty());
        assert_eq!(reg.tools_for_mode(&Mode::Docs).len(), 3);
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("héllo", 2), "hé");
        assert_eq!(clip("abc", 10), "abc");
    }
}
