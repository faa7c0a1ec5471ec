use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use studio_config::schema::WebConfig;
use studio_core::{Mode, Result, StudioError};
use studio_llm::ChatModel;
use studio_memory::MemoryStore;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::context::{EngineSettings, StageContext};
use crate::retriever::{InMemoryRetriever, Retriever};
use crate::router::{Branch, branch_for, route};
use crate::stage::{StageId, branch_stages};
use crate::stages;
use crate::state::{RequestState, StateUpdate};
use crate::tools::ToolRegistry;
use crate::tools::web::{HttpWebResearch, WebResearch};

/// The compiled stage graph: one validated stage sequence per branch.
struct Graph {
    branches: HashMap<Branch, &'static [StageId]>,
}

impl Graph {
    fn build() -> Result<Self> {
        let mut branches = HashMap::new();
        for branch in Branch::ALL {
            let stages = branch_stages(branch);
            if stages.last() != Some(&StageId::MemoryWrite) {
                return Err(StudioError::EngineNotCompiled(format!(
                    "branch '{branch}' does not end with memory-write"
                )));
            }
            for (i, stage) in stages.iter().enumerate() {
                if stages[..i].contains(stage) {
                    return Err(StudioError::EngineNotCompiled(format!(
                        "branch '{branch}' schedules '{stage}' twice"
                    )));
                }
            }
            branches.insert(branch, stages);
        }
        Ok(Self { branches })
    }

    fn stages(&self, branch: Branch) -> Result<&'static [StageId]> {
        self.branches.get(&branch).copied().ok_or_else(|| {
            StudioError::EngineNotCompiled(format!("no stages for branch '{branch}'"))
        })
    }
}

/// Runs requests through the stage graph.
///
/// Compile once, run many. `run` compiles lazily on first use; concurrent
/// runs share the engine and its stores.
pub struct Engine {
    ctx: StageContext,
    graph: OnceCell<Graph>,
}

impl Engine {
    pub fn builder(model: ChatModel, memory: Arc<MemoryStore>) -> EngineBuilder {
        EngineBuilder {
            model,
            memory,
            retriever: None,
            web: None,
            tools: None,
            settings: EngineSettings::default(),
        }
    }

    /// Build and validate the stage graph. Idempotent.
    pub fn compile(&self) -> Result<()> {
        self.graph()?;
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.graph.get().is_some()
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph.get_or_try_init(|| {
            let graph = Graph::build()?;
            info!(branches = graph.branches.len(), "engine graph compiled");
            Ok(graph)
        })
    }

    /// The stages a run in `mode` will execute, in order.
    pub fn plan(&self, mode: &Mode) -> Result<&'static [StageId]> {
        self.graph()?.stages(branch_for(mode))
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.ctx.memory
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.ctx.settings
    }

    pub fn model(&self) -> &ChatModel {
        &self.ctx.model
    }

    /// Answer one question end to end and return the final state.
    pub async fn run(
        &self,
        question: &str,
        user_id: &str,
        mode: impl Into<Mode>,
        video_url: &str,
    ) -> Result<RequestState> {
        let (state, _) = self.run_traced(question, user_id, mode, video_url).await?;
        Ok(state)
    }

    /// Like [`Engine::run`], also returning the stages executed in order.
    pub async fn run_traced(
        &self,
        question: &str,
        user_id: &str,
        mode: impl Into<Mode>,
        video_url: &str,
    ) -> Result<(RequestState, Vec<StageId>)> {
        let graph = self.graph()?;
        if question.trim().is_empty() {
            return Err(StudioError::MissingState("question"));
        }
        if user_id.trim().is_empty() {
            return Err(StudioError::MissingState("user_id"));
        }

        let mut state = RequestState::new(question, user_id, mode.into(), video_url);
        let branch = route(&state);
        if !state.mode.is_known() {
            warn!(mode = %state.mode, "unrecognized mode, answering as docs");
            state.mode = branch.mode();
        }

        let stages = graph.stages(branch)?;
        let span = info_span!("run", mode = %state.mode, user = %user_id);
        self.run_stages(branch, stages, state).instrument(span).await
    }

    async fn run_stages(
        &self,
        branch: Branch,
        stages: &'static [StageId],
        mut state: RequestState,
    ) -> Result<(RequestState, Vec<StageId>)> {
        info!(%branch, stages = stages.len(), "run started");
        let started = Instant::now();
        let mut trace = Vec::with_capacity(stages.len());

        for &stage in stages {
            let stage_started = Instant::now();
            let update = self.dispatch(stage, &state).await.map_err(|e| {
                warn!(stage = stage.name(), error = %e, "stage failed, aborting run");
                e
            })?;
            debug!(
                stage = stage.name(),
                elapsed_ms = stage_started.elapsed().as_millis() as u64,
                fields = ?update.fields(),
                "stage complete"
            );
            update.apply(&mut state);
            trace.push(stage);
        }

        info!(
            %branch,
            elapsed_ms = started.elapsed().as_millis() as u64,
            answer_chars = state.answer.len(),
            "run complete"
        );
        Ok((state, trace))
    }

    async fn dispatch(&self, stage: StageId, state: &RequestState) -> Result<StateUpdate> {
        let ctx = &self.ctx;
        match stage {
            StageId::MemoryRead => stages::memory::read(ctx, state).await,
            StageId::Retrieve => stages::retrieve::run(ctx, state).await,
            StageId::VideoPrecontext => stages::video::precontext(ctx, state).await,
            StageId::VideoChapters => stages::video::chapters(ctx, state).await,
            StageId::PreToolContext => stages::context::run(ctx, state).await,
            StageId::AnswerGeneration => stages::answer::run(ctx, state).await,
            StageId::ProductBuilder => stages::product::run(ctx, state).await,
            StageId::ResearchPrecontext => stages::research::precontext(ctx, state).await,
            StageId::ResearchAgent => stages::research::agent(ctx, state).await,
            StageId::Write => stages::write::run(ctx, state).await,
            StageId::MemoryWrite => stages::memory::write(ctx, state).await,
        }
    }
}

/// Assembles an [`Engine`] from its collaborators.
pub struct EngineBuilder {
    model: ChatModel,
    memory: Arc<MemoryStore>,
    retriever: Option<Arc<dyn Retriever>>,
    web: Option<Arc<dyn WebResearch>>,
    tools: Option<ToolRegistry>,
    settings: EngineSettings,
}

impl EngineBuilder {
    /// Passage source for docs and video. Defaults to an empty corpus.
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Web access for the research and product tools. Defaults to HTTP.
    pub fn web(mut self, web: Arc<dyn WebResearch>) -> Self {
        self.web = Some(web);
        self
    }

    /// Use these tool sets instead of the standard ones.
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<Engine> {
        let retriever = self
            .retriever
            .unwrap_or_else(|| Arc::new(InMemoryRetriever::default()));
        let tools = match self.tools {
            Some(tools) => tools,
            None => {
                let web = match self.web {
                    Some(web) => web,
                    None => Arc::new(HttpWebResearch::new(&WebConfig::default())?),
                };
                ToolRegistry::new(self.model.clone(), retriever.clone(), web)
            }
        };

        Ok(Engine {
            ctx: StageContext {
                model: self.model,
                retriever,
                memory: self.memory,
                tools,
                settings: self.settings,
            },
            graph: OnceCell::new(),
        })
    }
}
