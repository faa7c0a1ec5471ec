use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration, mapped to `studio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub agent: AgentConfig,
    pub memory: MemoryConfig,
    pub sessions: SessionsConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

/// `~/.studio`, or `./.studio` when no home directory is known.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".studio")
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ── LLM ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider label used in logs, e.g. "groq", "openai".
    pub provider: String,
    /// OpenAI-compatible API root.
    pub base_url: String,
    pub model: String,
    /// API key. Falls back to STUDIO_LLM_API_KEY, then GROQ_API_KEY.
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".into(),
            base_url: "https://api.groq.com/openai/v1".into(),
            model: "openai/gpt-oss-20b".into(),
            api_key: None,
            temperature: 0.1,
            max_tokens: 2048,
        }
    }
}

// ── Retrieval ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages fetched for docs questions.
    pub docs_k: usize,
    /// Passages fetched for video questions.
    pub video_k: usize,
    /// Chunk size in characters for local ingestion.
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            docs_k: 4,
            video_k: 15,
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }
}

// ── Agent ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Tool-loop bound for docs, video, and product answers.
    pub max_tool_steps: usize,
    /// Reasoning-step bound for the research agent.
    pub research_max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_steps: 6,
            research_max_steps: 15,
        }
    }
}

// ── Memory ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// JSON file holding every user's memory snippets.
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: data_dir().join("user_memory.json"),
        }
    }
}

// ── Sessions ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Root directory for per-user session files.
    pub history_dir: PathBuf,
    /// Messages included as context for follow-up questions.
    pub context_messages: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            history_dir: data_dir().join("history"),
            context_messages: 6,
        }
    }
}

// ── Web ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub timeout_secs: u64,
    pub max_results: usize,
    /// Scraped page text is cut to this many characters.
    pub scrape_max_chars: usize,
    pub user_agent: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 12,
            max_results: 6,
            scrape_max_chars: 6000,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0 Safari/537.36"
                .into(),
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl StudioConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Model ───
        if self.llm.model.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "llm.model".into(),
                message: "model is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'openai/gpt-oss-20b'".into()),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            warnings.push(ConfigWarning {
                field: "llm.temperature".into(),
                message: format!("temperature {} is out of range", self.llm.temperature),
                severity: WarningSeverity::Error,
                hint: Some("Temperature must be between 0.0 and 2.0".into()),
            });
        }

        if self.llm.max_tokens == 0 {
            warnings.push(ConfigWarning {
                field: "llm.max_tokens".into(),
                message: "max_tokens is 0 — the model won't produce output".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 2048".into()),
            });
        }

        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                field: "llm.base_url".into(),
                message: format!("'{}' is not an http(s) URL", self.llm.base_url),
                severity: WarningSeverity::Error,
                hint: Some("Use e.g. 'https://api.groq.com/openai/v1'".into()),
            });
        }

        // ── API key ───
        if self.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            warnings.push(ConfigWarning {
                field: "llm.api_key".into(),
                message: "no API key configured — questions will fail".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set llm.api_key or export GROQ_API_KEY".into()),
            });
        }

        // ── Retrieval ───
        if self.retrieval.docs_k == 0 || self.retrieval.video_k == 0 {
            warnings.push(ConfigWarning {
                field: "retrieval".into(),
                message: "docs_k and video_k must be at least 1".into(),
                severity: WarningSeverity::Error,
                hint: Some("Defaults are docs_k = 4, video_k = 15".into()),
            });
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            warnings.push(ConfigWarning {
                field: "retrieval.chunk_overlap".into(),
                message: format!(
                    "overlap {} must be smaller than chunk_size {}",
                    self.retrieval.chunk_overlap, self.retrieval.chunk_size
                ),
                severity: WarningSeverity::Error,
                hint: Some("Defaults are chunk_size = 300, chunk_overlap = 50".into()),
            });
        }

        // ── Agent bounds ───
        if self.agent.max_tool_steps == 0 || self.agent.research_max_steps == 0 {
            warnings.push(ConfigWarning {
                field: "agent".into(),
                message: "tool loops need at least one step".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        } else if self.agent.research_max_steps > 50 {
            warnings.push(ConfigWarning {
                field: "agent.research_max_steps".into(),
                message: format!(
                    "{} research steps can take minutes and burn quota",
                    self.agent.research_max_steps
                ),
                severity: WarningSeverity::Warning,
                hint: Some("15 is usually enough".into()),
            });
        }

        // ── Sessions ───
        if self.sessions.context_messages == 0 {
            warnings.push(ConfigWarning {
                field: "sessions.context_messages".into(),
                message: "follow-up questions will carry no conversation context".into(),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
