use std::path::PathBuf;

const STARTER_CONFIG: &str = r#"# 🎛  Studio Configuration

[llm]
provider = "groq"
base_url = "https://api.groq.com/openai/v1"
model = "openai/gpt-oss-20b"
# api_key = "gsk_..."   # or env: STUDIO_LLM_API_KEY / GROQ_API_KEY
temperature = 0.1
max_tokens = 2048

[retrieval]
docs_k = 4
video_k = 15
chunk_size = 300
chunk_overlap = 50

[agent]
max_tool_steps = 6
research_max_steps = 15

[memory]
# path = "~/.studio/user_memory.json"

[sessions]
# history_dir = "~/.studio/history"
context_messages = 6

[web]
timeout_secs = 12
max_results = 6
scrape_max_chars = 6000

[logging]
level = "info"
# format = "pretty"   # pretty, compact, or json
"#;


/// Write a starter studio.toml with the defaults spelled out.
pub(super) fn cmd_init(local: bool) -> studio_core::Result<()> {
    let dir = if local {
        std::env::current_dir()?
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".studio")
    };

    std::fs::create_dir_all(&dir)?;
    let config_path = dir.join("studio.toml");

    if config_path.exists() {
        println!("⚠️  {} already exists", config_path.display());
        println!("   Run 'studio doctor' to check it.");
        return Ok(());
    }


    std::fs::write(&config_path, STARTER_CONFIG)?;
    println!("✅ Created {}", config_path.display());
    println!("   Add your API key, then run: studio ask \"What is in my notes?\" --doc notes.txt");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use studio_config::ConfigLoader;

    #[test]
    fn test_starter_config_matches_defaults() {
        let config = ConfigLoader::parse(STARTER_CONFIG, Path::new("studio.toml")).unwrap();
        let defaults = studio_config::StudioConfig::default();
        assert_eq!(config.llm.model, defaults.llm.model);
        assert_eq!(config.retrieval.docs_k, 4);
        assert_eq!(config.retrieval.video_k, 15);
        assert_eq!(config.agent.research_max_steps, 15);
        assert_eq!(config.sessions.context_messages, 6);
        assert_eq!(config.memory.path, defaults.memory.path);
        assert!(config.llm.api_key.is_none());
    }
}
