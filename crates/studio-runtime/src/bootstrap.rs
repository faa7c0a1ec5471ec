//! Wiring from a loaded [`StudioConfig`] to a ready engine and stores.

use std::path::Path;
use std::sync::Arc;
use studio_config::StudioConfig;
use studio_core::{Result, StudioError};
use studio_llm::{ChatModel, OpenAiProvider};
use studio_memory::{MemoryStore, SessionStore};
use tracing::info;

use crate::context::EngineSettings;
use crate::engine::Engine;
use crate::retriever::{InMemoryRetriever, Retriever};
use crate::tools::web::HttpWebResearch;

/// The chat model described by `config.llm`.
pub fn build_model(config: &StudioConfig) -> Result<ChatModel> {
    let api_key = config
        .llm
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            StudioError::Config(
                "no LLM API key configured; set llm.api_key or export GROQ_API_KEY".into(),
            )
        })?;
    let provider = OpenAiProvider::new(api_key)
        .with_base_url(config.llm.base_url.clone(), config.llm.provider.clone());
    Ok(ChatModel::new(Arc::new(provider), config.llm.model.clone())
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens))
}

pub fn open_memory(config: &StudioConfig) -> MemoryStore {
    MemoryStore::open(&config.memory.path)
}

pub fn open_sessions(config: &StudioConfig) -> SessionStore {
    SessionStore::new(config.sessions.history_dir.clone())
}

/// A compiled engine over `retriever`, using the configured model, memory
/// file, and web settings.
pub fn build_engine(config: &StudioConfig, retriever: Arc<dyn Retriever>) -> Result<Engine> {
    let model = build_model(config)?;
    let memory = Arc::new(open_memory(config));
    let web = Arc::new(HttpWebResearch::new(&config.web)?);

    let engine = Engine::builder(model, memory)
        .retriever(retriever)
        .web(web)
        .settings(EngineSettings::from(config))
        .build()?;
    engine.compile()?;
    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        memory = %config.memory.path.display(),
        "engine ready"
    );
    Ok(engine)
}

/// Index local files for docs questions, chunked per `config.retrieval`.
pub fn load_documents(config: &StudioConfig, paths: &[impl AsRef<Path>]) -> Result<InMemoryRetriever> {
    let mut retriever = InMemoryRetriever::default();
    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        retriever.add_document(
            &source,
            &text,
            config.retrieval.chunk_size,
            config.retrieval.chunk_overlap,
        );
    }
    info!(files = paths.len(), passages = retriever.len(), "documents indexed");
    Ok(retriever)
}

/// Index a transcript file. Lines may start with a `[5:30]`, `[5m30s]`, or
/// `[330]` timestamp; lines without one inherit the previous timestamp.
pub fn load_transcript(config: &StudioConfig, path: &Path) -> Result<InMemoryRetriever> {
    let text = std::fs::read_to_string(path)?;
    let lines = parse_transcript(&text);
    let source = path.display().to_string();

    let mut retriever = InMemoryRetriever::default();
    retriever.add_transcript(&source, &lines, config.retrieval.chunk_size);
    info!(lines = lines.len(), passages = retriever.len(), "transcript indexed");
    Ok(retriever)
}

pub fn parse_transcript(text: &str) -> Vec<(f64, String)> {
    let mut current = 0.0;
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let body = match line.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
                Some((stamp, rest)) => match crate::tools::corpus::parse_timestamp(stamp) {
                    Some(secs) => {
                        current = secs as f64;
                        rest.trim()
                    }
                    None => line,
                },
                None => line,
            };
            Some((current, body.to_string()))
        })
        .collect()
}
