use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use studio_core::{Mode, StudioError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-message cap applied when building follow-up context.
pub const CONTEXT_MESSAGE_CHARS: usize = 500;
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub mode: Mode,
    #[serde(with = "studio_core::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// An append-only conversation owned by one `(user_id, mode)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub user_id: String,
    pub mode: Mode,
    #[serde(with = "studio_core::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ChatSession {
    pub fn new(user_id: &str, mode: Mode) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            session_id: format!("session_{}", &id[..12]),
            user_id: user_id.to_string(),
            mode,
            created_at: Utc::now(),
            messages: vec![],
            metadata: Map::new(),
        }
    }

    pub fn push(&mut self, role: ChatRole, content: &str, metadata: Map<String, Value>) {
        self.messages.push(ChatMessage {
            role,
            content: content.to_string(),
            mode: self.mode.clone(),
            timestamp: Utc::now(),
            metadata,
        });
    }

    /// The last `max_messages` messages as `User: …` / `Assistant: …`
    /// paragraphs, each capped at 500 characters.
    pub fn context(&self, max_messages: usize) -> String {
        let start = self.messages.len().saturating_sub(max_messages);
        self.messages[start..]
            .iter()
            .map(|m| {
                let content: String = m.content.chars().take(CONTEXT_MESSAGE_CHARS).collect();
                format!("{}: {}", m.role.label(), content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            mode: self.mode.clone(),
            created_at: self.created_at,
            message_count: self.messages.len(),
            preview: self
                .messages
                .first()
                .map(|m| m.content.chars().take(PREVIEW_CHARS).collect())
                .unwrap_or_default(),
        }
    }
}

/// One line of a session listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub preview: String,
}

/// Chat sessions cached in memory and persisted as
/// `<history_dir>/<user_id>/<session_id>.json`.
pub struct SessionStore {
    dir: PathBuf,
    active: Mutex<HashMap<String, ChatSession>>,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        info!(?dir, "opening session store");
        Self {
            dir,
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start a new session. It is written to disk on its first message.
    pub fn create_session(&self, user_id: &str, mode: Mode) -> ChatSession {
        let session = ChatSession::new(user_id, mode);
        debug!(session = %session.session_id, user = %user_id, "session created");
        self.active
            .lock()
            .insert(session.session_id.clone(), session.clone());
        session
    }

    /// Resume `session_id` from the cache or from disk, or start a new session.
    pub fn get_or_create(
        &self,
        user_id: &str,
        mode: Mode,
        session_id: Option<&str>,
    ) -> ChatSession {
        if let Some(id) = session_id {
            if let Some(session) = self.active.lock().get(id) {
                return session.clone();
            }
            if let Some(session) = self.load_session(user_id, id) {
                self.active.lock().insert(id.to_string(), session.clone());
                return session;
            }
            debug!(session = %id, "session not found, starting a new one");
        }
        self.create_session(user_id, mode)
    }

    pub fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.active.lock().get(session_id).cloned()
    }

    /// Read a session file. Missing or corrupt files yield `None`.
    pub fn load_session(&self, user_id: &str, session_id: &str) -> Option<ChatSession> {
        let path = self.session_path(user_id, session_id);
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(?path, error = %e, "session file corrupt, ignoring");
                None
            }
        }
    }

    /// Append a message to an active session and persist it immediately.
    /// Returns `Ok(false)` if the session is not active. On a failed write
    /// the cached session is left unchanged.
    pub fn add_message(
        &self,
        session_id: &str,
        role: ChatRole,
        content: &str,
        metadata: Option<Map<String, Value>>,
    ) -> studio_core::Result<bool> {
        let mut active = self.active.lock();
        let Some(mut updated) = active.get(session_id).cloned() else {
            return Ok(false);
        };
        updated.push(role, content, metadata.unwrap_or_default());
        self.persist(&updated)?;
        active.insert(session_id.to_string(), updated);
        Ok(true)
    }

    /// Follow-up context for an active session; empty if unknown.
    pub fn get_context(&self, session_id: &str, max_messages: usize) -> String {
        self.active
            .lock()
            .get(session_id)
            .map(|s| s.context(max_messages))
            .unwrap_or_default()
    }

    /// Most recent sessions first.
    pub fn list_sessions(&self, user_id: &str, limit: usize) -> Vec<SessionSummary> {
        let user_dir = self.dir.join(namespace(user_id));
        let Ok(entries) = std::fs::read_dir(&user_dir) else {
            return vec![];
        };

        let mut summaries: Vec<SessionSummary> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let raw = std::fs::read_to_string(&path).ok()?;
                serde_json::from_str::<ChatSession>(&raw).ok()
            })
            .map(|session| session.summary())
            .collect();

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit);
        summaries
    }

    /// Remove a session from the cache and from disk.
    pub fn delete_session(&self, user_id: &str, session_id: &str) -> studio_core::Result<bool> {
        let cached = self.active.lock().remove(session_id).is_some();
        let path = self.session_path(user_id, session_id);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StudioError::Session(format!("{}: {e}", path.display())))?;
            info!(session = %session_id, user = %user_id, "session deleted");
            return Ok(true);
        }
        Ok(cached)
    }

    /// Drop a session from the cache only; its file is kept.
    pub fn clear_session(&self, session_id: &str) {
        self.active.lock().remove(session_id);
    }

    fn session_path(&self, user_id: &str, session_id: &str) -> PathBuf {
        self.dir
            .join(namespace(user_id))
            .join(format!("{}.json", namespace(session_id)))
    }

    fn persist(&self, session: &ChatSession) -> studio_core::Result<()> {
        let path = self.session_path(&session.user_id, &session.session_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StudioError::Session(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, json)
            .map_err(|e| StudioError::Session(format!("{}: {e}", path.display())))?;
        Ok(())
    }
}

/// File-system safe form of an identifier.
fn namespace(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
