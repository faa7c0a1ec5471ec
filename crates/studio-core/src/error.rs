use thiserror::Error;

/// Unified error type for the studio orchestrator.
#[derive(Error, Debug)]
pub enum StudioError {
    // ── LLM errors ─────────────────────────────────────────────
    #[error("llm provider error: {0}")]
    LlmProvider(String),

    #[error("llm rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("model rejected tool calling: {0}")]
    ToolCalling(String),

    // ── Tool errors ────────────────────────────────────────────
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool execution failed: {tool}: {reason}")]
    ToolExecution { tool: String, reason: String },

    #[error("tool loop did not finish within {steps} steps")]
    ToolLoopExhausted { steps: usize },

    // ── Retrieval errors ───────────────────────────────────────
    #[error("retrieval error: {0}")]
    Retrieval(String),

    // ── Memory / session errors ────────────────────────────────
    #[error("memory error: {0}")]
    Memory(String),

    #[error("session error: {0}")]
    Session(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Engine errors ──────────────────────────────────────────
    #[error("engine graph is not compiled: {0}")]
    EngineNotCompiled(String),

    #[error("request state is missing required field `{0}`")]
    MissingState(&'static str),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Failures local to tool use. These are the only errors a stage may
    /// recover from by switching to its plain-prompt fallback.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            StudioError::ToolCalling(_)
                | StudioError::ToolNotFound(_)
                | StudioError::ToolExecution { .. }
                | StudioError::ToolLoopExhausted { .. }
        )
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StudioError::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failures_are_recoverable() {
        assert!(StudioError::ToolNotFound("x".into()).is_tool_failure());
        assert!(StudioError::ToolLoopExhausted { steps: 3 }.is_tool_failure());
        assert!(
            StudioError::ToolExecution {
                tool: "web_search".into(),
                reason: "boom".into()
            }
            .is_tool_failure()
        );
    }

    #[test]
    fn test_provider_failures_propagate() {
        assert!(!StudioError::LlmProvider("HTTP 500".into()).is_tool_failure());
        let limited = StudioError::RateLimited { retry_after_secs: 30 };
        assert!(!limited.is_tool_failure());
        assert!(limited.is_rate_limited());
        assert_eq!(limited.to_string(), "llm rate limited, retry after 30s");
    }
}
