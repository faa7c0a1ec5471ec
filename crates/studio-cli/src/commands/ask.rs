use serde_json::{Map, Value, json};
use tracing::warn;

use studio_config::StudioConfig;
use studio_core::Mode;
use studio_memory::{ChatRole, SessionStore};
use studio_runtime::{Engine, RequestState, bootstrap};

use super::{CorpusArgs, load_corpus, spinner};

pub(super) struct AskRequest {
    pub user: String,
    pub question: String,
    pub mode: Mode,
    pub video_url: String,
    pub session: Option<String>,
    pub json: bool,
}

pub(super) async fn cmd_ask(
    config: StudioConfig,
    corpus: CorpusArgs,
    request: AskRequest,
) -> studio_core::Result<()> {
    let retriever = load_corpus(&config, &corpus)?;
    let engine = bootstrap::build_engine(&config, retriever)?;

    let state = match &request.session {
        Some(session_id) => {
            let sessions = bootstrap::open_sessions(&config);
            let session =
                sessions.get_or_create(&request.user, request.mode.clone(), Some(session_id.as_str()));
            if session.session_id != *session_id {
                eprintln!("\x1b[33m⚠️  Session {session_id} not found, started {}\x1b[0m", session.session_id);
            }
            let state = ask_in_session(
                &engine,
                &sessions,
                &session.session_id,
                config.sessions.context_messages,
                &request,
            )
            .await?;
            eprintln!("\x1b[90m   session {}\x1b[0m", session.session_id);
            state
        }
        None => {
            let pb = spinner(&format!("Thinking ({})...", request.mode));
            let result = engine
                .run(&request.question, &request.user, request.mode.clone(), &request.video_url)
                .await;
            pb.finish_and_clear();
            result?
        }
    };

    if request.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&state);
    }
    Ok(())
}

/// Run one question in a session, then record both turns in it. Docs
/// questions get the session's recent turns as context.
pub(super) async fn ask_in_session(
    engine: &Engine,
    sessions: &SessionStore,
    session_id: &str,
    context_messages: usize,
    request: &AskRequest,
) -> studio_core::Result<RequestState> {
    let history = sessions.get_context(session_id, context_messages);
    let prompt = super::chat::engine_question(&request.mode, &history, &request.question);

    let pb = spinner(&format!("Thinking ({})...", request.mode));
    let result = engine
        .run(&prompt, &request.user, request.mode.clone(), &request.video_url)
        .await;
    pb.finish_and_clear();
    let state = result?;

    sessions.add_message(session_id, ChatRole::User, &request.question, None)?;
    if !sessions.add_message(
        session_id,
        ChatRole::Assistant,
        &state.answer,
        Some(turn_metadata(&state)),
    )? {
        warn!(session = %session_id, "session closed before the answer was recorded");
    }
    Ok(state)
}

fn turn_metadata(state: &RequestState) -> Map<String, Value> {
    let mut metadata = Map::new();
    if let Some(intent) = &state.intent {
        metadata.insert("intent".into(), json!(intent.as_str()));
    }
    metadata.insert("passages".into(), json!(state.retrieved_passages.len()));
    if !state.video_chapters.is_empty() {
        metadata.insert("chapters".into(), json!(state.video_chapters));
    }
    metadata
}

pub(super) fn print_state(state: &RequestState) {
    println!("{}", state.answer);
    if !state.video_chapters.is_empty() {
        println!();
        println!("\x1b[1mChapters\x1b[0m");
        for chapter in &state.video_chapters {
            println!("  {chapter}");
        }
    }
    if let Some(snippet) = &state.memory_snippet_to_save {
        eprintln!("\x1b[90m   🧠 memory candidate: {snippet}\x1b[0m");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use studio_core::Category;
    use studio_llm::{ChatModel, MockProvider};
    use studio_memory::MemoryStore;
    use studio_runtime::{InMemoryRetriever, ToolRegistry};

    fn engine(mock: &Arc<MockProvider>, memory: &Arc<MemoryStore>) -> Engine {
        Engine::builder(ChatModel::new(mock.clone(), "test-model"), memory.clone())
            .retriever(Arc::new(InMemoryRetriever::default()))
            .tools(ToolRegistry::default())
            .build()
            .unwrap()
    }

    fn request(mode: Mode, question: &str) -> AskRequest {
        AskRequest {
            user: "bob".into(),
            question: question.into(),
            mode,
            video_url: String::new(),
            session: None,
            json: false,
        }
    }

    #[tokio::test]
    async fn test_product_follow_up_remembers_bare_question() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockProvider::new("mock").with_default_response("blueprint"));
        let memory = Arc::new(MemoryStore::in_memory());
        let engine = engine(&mock, &memory);
        let sessions = SessionStore::new(dir.path());
        let session = sessions.create_session("bob", Mode::Product);

        for question in ["A habit tracker app", "Add social features"] {
            let turn = request(Mode::Product, question);
            ask_in_session(&engine, &sessions, &session.session_id, 6, &turn)
                .await
                .unwrap();
        }

        let mut stored: Vec<String> = memory.all("bob").into_iter().map(|m| m.content).collect();
        stored.sort();
        assert_eq!(
            stored,
            vec![
                "Built MVP for: A habit tracker app".to_string(),
                "Built MVP for: Add social features".to_string(),
            ]
        );
        assert!(memory.all("bob").iter().all(|m| m.category == Category::Product));
        assert_eq!(sessions.get_session(&session.session_id).unwrap().messages.len(), 4);
    }

    #[tokio::test]
    async fn test_docs_follow_up_sends_history() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockProvider::new("mock").with_default_response("An async runtime."));
        let memory = Arc::new(MemoryStore::in_memory());
        let engine = engine(&mock, &memory);
        let sessions = SessionStore::new(dir.path());
        let session = sessions.create_session("bob", Mode::Docs);

        let first = request(Mode::Docs, "What is Tokio?");
        ask_in_session(&engine, &sessions, &session.session_id, 6, &first)
            .await
            .unwrap();
        let follow_up = request(Mode::Docs, "Does it have timers?");
        let state = ask_in_session(&engine, &sessions, &session.session_id, 6, &follow_up)
            .await
            .unwrap();

        assert!(state.question.starts_with("Previous conversation:\nUser: What is Tokio?"));
        assert!(state.question.ends_with("New question: Does it have timers?"));
        let recorded = sessions.get_session(&session.session_id).unwrap();
        assert_eq!(recorded.messages[2].content, "Does it have timers?");
    }
}
