use studio_config::StudioConfig;
use studio_core::StudioError;
use studio_memory::ChatRole;
use studio_runtime::bootstrap;

use super::SessionAction;

pub(super) fn cmd_sessions(
    config: StudioConfig,
    user: &str,
    action: SessionAction,
) -> studio_core::Result<()> {
    let store = bootstrap::open_sessions(&config);

    match action {
        SessionAction::List { limit } => {
            let sessions = store.list_sessions(user, limit);
            if sessions.is_empty() {
                println!("No sessions for {user}.");
                return Ok(());
            }
            println!("\x1b[1mSessions for {user}\x1b[0m ({})", sessions.len());
            println!("{}", "-".repeat(80));
            for s in &sessions {
                println!(
                    "{}  \x1b[90m{}\x1b[0m  \x1b[36m{:<8}\x1b[0m  {:>3} msgs  {}",
                    s.session_id,
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.mode.as_str(),
                    s.message_count,
                    s.preview.replace('\n', " ")
                );
            }
        }
        SessionAction::Show { id, json } => {
            let session = store
                .load_session(user, &id)
                .ok_or_else(|| StudioError::Session(format!("no session '{id}' for {user}")))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
                return Ok(());
            }
            println!(
                "\x1b[1mSession {}\x1b[0m ({}, started {})",
                session.session_id,
                session.mode,
                session.created_at.to_rfc3339()
            );
            println!();
            for m in &session.messages {
                let label = match m.role {
                    ChatRole::User => "\x1b[36myou>\x1b[0m",
                    ChatRole::Assistant => "\x1b[32mstudio>\x1b[0m",
                };
                println!("\x1b[90m{}\x1b[0m {label} {}", m.timestamp.format("%H:%M:%S"), m.content);
                println!();
            }
        }
        SessionAction::Delete { id } => {
            if store.delete_session(user, &id)? {
                println!("✅ Deleted session {id}");
            } else {
                println!("No session '{id}' for {user}.");
            }
        }
    }
    Ok(())
}
