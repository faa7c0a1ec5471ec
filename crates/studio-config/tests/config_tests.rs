#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::Path;
    use studio_config::schema::*;
    use studio_config::{ConfigLoader, expand_home};

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "openai/gpt-oss-20b");
        assert_eq!(config.provider, "groq");
        assert_eq!(config.temperature, 0.1);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_retrieval_config_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.docs_k, 4);
        assert_eq!(config.video_k, 15);
        assert_eq!(config.chunk_size, 300);
        assert_eq!(config.chunk_overlap, 50);
    }

    #[test]
    fn test_agent_and_session_defaults() {
        assert_eq!(AgentConfig::default().research_max_steps, 15);
        assert_eq!(SessionsConfig::default().context_messages, 6);
        assert!(MemoryConfig::default().path.ends_with(".studio/user_memory.json"));
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = StudioConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: StudioConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.llm.model, config.llm.model);
        assert_eq!(restored.retrieval.video_k, config.retrieval.video_k);
        assert_eq!(restored.memory.path, config.memory.path);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[llm]
model = "llama-3.3-70b-versatile"

[retrieval]
docs_k = 6
"#;
        let config: StudioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.retrieval.docs_k, 6);
        assert_eq!(config.retrieval.video_k, 15);
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.web.scrape_max_chars, 6000);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = ConfigLoader::parse("[llm\nmodel=", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    // ── Env overrides ──────────────────────────────────────────

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_model_and_level() {
        let config = ConfigLoader::apply_env_overrides(
            StudioConfig::default(),
            env(&[("STUDIO_LLM_MODEL", "qwen/qwen3-32b"), ("STUDIO_LOG_LEVEL", "debug")]),
        );
        assert_eq!(config.llm.model, "qwen/qwen3-32b");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_api_key_env_is_fallback_only() {
        let from_env = ConfigLoader::apply_env_overrides(
            StudioConfig::default(),
            env(&[("GROQ_API_KEY", "gsk_env")]),
        );
        assert_eq!(from_env.llm.api_key.as_deref(), Some("gsk_env"));

        let preferred = ConfigLoader::apply_env_overrides(
            StudioConfig::default(),
            env(&[("GROQ_API_KEY", "gsk_env"), ("STUDIO_LLM_API_KEY", "studio_env")]),
        );
        assert_eq!(preferred.llm.api_key.as_deref(), Some("studio_env"));

        let mut file = StudioConfig::default();
        file.llm.api_key = Some("from_file".into());
        let kept = ConfigLoader::apply_env_overrides(file, env(&[("GROQ_API_KEY", "gsk_env")]));
        assert_eq!(kept.llm.api_key.as_deref(), Some("from_file"));
    }

    // ── Validation ─────────────────────────────────────────────

    #[test]
    fn test_default_config_warns_about_missing_key() {
        let warnings = StudioConfig::default().validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "llm.api_key"));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = StudioConfig::default();
        config.llm.temperature = 3.5;
        config.retrieval.chunk_overlap = 400;
        let err = config.validate().unwrap_err();
        assert!(err.contains("llm.temperature"));
        assert!(err.contains("retrieval.chunk_overlap"));
    }

    #[test]
    fn test_unknown_log_format_is_warning() {
        let mut config = StudioConfig::default();
        config.llm.api_key = Some("k".into());
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        let w = warnings.iter().find(|w| w.field == "logging.format").unwrap();
        assert_eq!(w.severity, WarningSeverity::Warning);
    }

    // ── Loader ─────────────────────────────────────────────────

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[llm]\napi_key = \"k\"\n\n[memory]\npath = \"~/custom/mem.json\"\n\n[agent]\nresearch_max_steps = 9"
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(&path)).unwrap();
        let config = loader.get();
        assert_eq!(config.agent.research_max_steps, 9);
        assert!(!config.memory.path.starts_with("~"));
        assert!(config.memory.path.ends_with("custom/mem.json"));
        assert_eq!(loader.path(), path.as_path());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.toml");
        std::fs::write(&path, "[llm]\nmax_tokens = 0\n").unwrap();
        assert!(ConfigLoader::load(Some(&path)).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(loader.get().retrieval.docs_k, 4);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/tmp/x")), Path::new("/tmp/x"));
        assert!(!expand_home(Path::new("~/x")).starts_with("~"));
    }
}
