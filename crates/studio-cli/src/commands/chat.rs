use std::io::Write;
use tokio::io::AsyncBufReadExt;

use studio_config::StudioConfig;
use studio_core::Mode;
use studio_runtime::bootstrap;

use super::ask::{AskRequest, ask_in_session, print_state};
use super::{CorpusArgs, load_corpus, print_error};

/// The question text handed to the engine. Only docs questions carry the
/// earlier turns; the other modes store or search on the bare question.
pub(super) fn engine_question(mode: &Mode, history: &str, question: &str) -> String {
    match mode {
        Mode::Docs | Mode::Unrecognized(_) => with_history(history, question),
        Mode::Video | Mode::Product | Mode::Research => question.to_string(),
    }
}

/// Prefix a question with earlier turns so follow-ups resolve.
fn with_history(history: &str, question: &str) -> String {
    if history.trim().is_empty() {
        question.to_string()
    } else {
        format!("Previous conversation:\n{history}\n\nNew question: {question}")
    }
}

pub(super) async fn cmd_chat(
    config: StudioConfig,
    corpus: CorpusArgs,
    user: String,
    mode: Mode,
    video_url: String,
    session: Option<String>,
) -> studio_core::Result<()> {
    let retriever = load_corpus(&config, &corpus)?;
    let engine = bootstrap::build_engine(&config, retriever)?;
    let memory = engine.memory().clone();
    let sessions = bootstrap::open_sessions(&config);

    let mut mode = mode;
    let mut session_id = sessions
        .get_or_create(&user, mode.clone(), session.as_deref())
        .session_id;

    println!("🎛  Studio Interactive Chat ({mode})");
    println!("   Type 'exit' or Ctrl+C to quit");
    println!("   Type '/mode <docs|video|product|research>' to switch modes");
    println!("   Type '/new' for a fresh session, '/memory' to see what is remembered");
    println!("\x1b[90m   session {session_id}\x1b[0m");
    println!();

    let stdin = tokio::io::stdin();
    let reader = tokio::io::BufReader::new(stdin);
    let mut lines = reader.lines();

    loop {
        eprint!("\x1b[36myou>\x1b[0m ");
        std::io::stderr().flush().ok();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break, // EOF
            Err(_) => break,
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" || trimmed == "/exit" {
            println!("👋 Goodbye!");
            break;
        }

        if let Some(rest) = trimmed.strip_prefix("/mode") {
            let next = Mode::from(rest.trim());
            if !next.is_known() {
                println!("\x1b[31m❌ unknown mode '{}'\x1b[0m", rest.trim());
                continue;
            }
            mode = next;
            session_id = sessions.create_session(&user, mode.clone()).session_id;
            println!("\x1b[90m   mode {mode}, session {session_id}\x1b[0m");
            continue;
        }
        match trimmed {
            "/new" => {
                sessions.clear_session(&session_id);
                session_id = sessions.create_session(&user, mode.clone()).session_id;
                println!("\x1b[90m   session {session_id}\x1b[0m");
                continue;
            }
            "/memory" => {
                let stored = memory.get(&user, None);
                if stored.is_empty() {
                    println!("\x1b[90m   nothing remembered yet\x1b[0m");
                } else {
                    for line in stored.lines() {
                        println!("   🧠 {line}");
                    }
                }
                continue;
            }
            _ => {}
        }

        let request = AskRequest {
            user: user.clone(),
            question: trimmed.to_string(),
            mode: mode.clone(),
            video_url: video_url.clone(),
            session: Some(session_id.clone()),
            json: false,
        };
        match ask_in_session(
            &engine,
            &sessions,
            &session_id,
            config.sessions.context_messages,
            &request,
        )
        .await
        {
            Ok(state) => {
                eprint!("\x1b[32mstudio>\x1b[0m ");
                print_state(&state);
            }
            Err(e) => print_error(&e),
        }
        println!();
    }

    Ok(())
}
