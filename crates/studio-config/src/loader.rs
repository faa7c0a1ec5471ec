use std::path::{Path, PathBuf};
use studio_core::StudioError;
use tracing::{info, warn};

use crate::schema::{StudioConfig, data_dir, expand_home};

/// Loads the studio configuration once per process.
pub struct ConfigLoader {
    config: StudioConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > STUDIO_CONFIG env > ~/.studio/studio.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("STUDIO_CONFIG") {
            return PathBuf::from(p);
        }
        data_dir().join("studio.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> studio_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw, &config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            StudioConfig::default()
        };

        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());
        let config = Self::resolve_paths(config);

        // Validate config, log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(StudioError::Config(e));
            }
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Parse TOML text; `origin` only labels the error.
    pub fn parse(raw: &str, origin: &Path) -> studio_core::Result<StudioConfig> {
        toml::from_str::<StudioConfig>(raw).map_err(|e| {
            StudioError::Config(format!("failed to parse {}: {}", origin.display(), e))
        })
    }

    /// Get a snapshot of the loaded config.
    pub fn get(&self) -> StudioConfig {
        self.config.clone()
    }

    /// Path the config was (or would have been) read from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides. `lookup` is `std::env::var` outside tests.
    ///
    /// API keys only fill in when the file leaves them unset; everything else
    /// overrides the file.
    pub fn apply_env_overrides(
        mut config: StudioConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StudioConfig {
        if let Some(v) = lookup("STUDIO_LLM_MODEL") {
            config.llm.model = v;
        }
        if let Some(v) = lookup("STUDIO_LLM_BASE_URL") {
            config.llm.base_url = v;
        }
        if let Some(v) = lookup("STUDIO_LOG_LEVEL") {
            config.logging.level = v;
        }
        if config.llm.api_key.is_none() {
            config.llm.api_key = lookup("STUDIO_LLM_API_KEY").or_else(|| lookup("GROQ_API_KEY"));
        }
        config
    }

    fn resolve_paths(mut config: StudioConfig) -> StudioConfig {
        config.memory.path = expand_home(&config.memory.path);
        config.sessions.history_dir = expand_home(&config.sessions.history_dir);
        config
    }
}
