use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use studio_config::{ConfigLoader, StudioConfig, WarningSeverity};
use studio_core::StudioError;
use studio_runtime::bootstrap;
use studio_runtime::{InMemoryRetriever, Retriever};

mod ask;
mod chat;
mod memory;
mod sessions;
mod setup;

/// 🎛  Studio: multi-mode assistant for documents, videos, products, and web research
#[derive(Parser)]
#[command(name = "studio", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to studio.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// User whose memory and sessions are used
    #[arg(short, long, global = true, env = "STUDIO_USER", default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

/// Passage sources shared by `ask` and `chat`.
#[derive(clap::Args, Clone)]
struct CorpusArgs {
    /// Plain-text document to index for docs questions (repeatable)
    #[arg(long = "doc", conflicts_with = "transcript")]
    docs: Vec<PathBuf>,

    /// Transcript file to index for video questions ("[5:30] text" lines)
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question
        question: String,
        /// docs, video, product, or research
        #[arg(short, long, default_value = "docs")]
        mode: String,
        #[command(flatten)]
        corpus: CorpusArgs,
        /// URL of the video the transcript belongs to
        #[arg(long, default_value = "")]
        video_url: String,
        /// Session ID to continue; earlier turns are sent as context
        #[arg(short, long)]
        session: Option<String>,
        /// Print the full final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat in the terminal
    Chat {
        /// docs, video, product, or research
        #[arg(short, long, default_value = "docs")]
        mode: String,
        #[command(flatten)]
        corpus: CorpusArgs,
        /// URL of the video the transcript belongs to
        #[arg(long, default_value = "")]
        video_url: String,
        /// Session ID to resume (creates new if omitted)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Inspect and curate stored memories
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Manage chat sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and report problems
    Doctor,
    /// Initialize a new studio.toml in the current or home directory
    Init {
        /// Create in current directory instead of ~/.studio/
        #[arg(long)]
        local: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// List a user's memories, highest score first
    List {
        /// Only this category (plus general memories)
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show memory statistics for a user
    Stats,
    /// List users with stored memories
    Users,
    /// Store a memory by hand
    Add {
        content: String,
        /// docs, video, product, research, or general
        #[arg(long, default_value = "general")]
        category: String,
        /// Explicit score between 1 and 5 (computed when omitted)
        #[arg(long)]
        score: Option<f64>,
    },
    /// Change a memory's score
    Rescore {
        /// Content hash (or a unique prefix)
        hash: String,
        score: f64,
    },
    /// Delete one memory
    Delete {
        /// Content hash (or a unique prefix)
        hash: String,
    },
    /// Delete every memory of the user
    Clear,
}

#[derive(Subcommand)]
enum SessionAction {
    /// List recent sessions
    List {
        /// Number of sessions to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Print a session transcript
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a session
    Delete { id: String },
}

impl Cli {
    pub async fn run(self) -> studio_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // --verbose > --quiet > --log-level > RUST_LOG > config
        let explicit = if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            self.log_level.as_deref()
        };
        init_tracing(&config, explicit);

        let user = self.user;
        match self.command {
            Commands::Ask {
                question,
                mode,
                corpus,
                video_url,
                session,
                json,
            } => {
                let request = ask::AskRequest {
                    user,
                    question,
                    mode: mode.as_str().into(),
                    video_url,
                    session,
                    json,
                };
                ask::cmd_ask(config, corpus, request).await
            }
            Commands::Chat {
                mode,
                corpus,
                video_url,
                session,
            } => chat::cmd_chat(config, corpus, user, mode.as_str().into(), video_url, session).await,
            Commands::Memory { action } => memory::cmd_memory(config, &user, action),
            Commands::Sessions { action } => sessions::cmd_sessions(config, &user, action),
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Doctor => Self::cmd_doctor(config, config_loader.path()),
            Commands::Init { local } => setup::cmd_init(local),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: StudioConfig, json: bool) -> studio_core::Result<()> {
        let mut config = config;
        if config.llm.api_key.is_some() {
            config.llm.api_key = Some("********".into());
        }
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| StudioError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_doctor(config: StudioConfig, path: &std::path::Path) -> studio_core::Result<()> {
        println!("🩺 Studio Doctor — Configuration Audit");
        println!("   {}", path.display());
        println!();

        let warnings = match config.validate() {
            Ok(w) => w,
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };

        let mut warn_count = 0;
        let mut info_count = 0;
        for w in &warnings {
            println!("  {w}");
            match w.severity {
                WarningSeverity::Warning => warn_count += 1,
                WarningSeverity::Info => info_count += 1,
                WarningSeverity::Error => {}
            }
        }

        if !config.memory.path.exists() {
            println!(
                "  💡 memory.path: {} does not exist yet — it is created on the first saved memory",
                config.memory.path.display()
            );
            info_count += 1;
        }

        println!();
        if warnings.is_empty() && info_count == 0 {
            println!("  ✅ configuration looks good");
        } else {
            println!("  ⚠️  {warn_count} warnings, 💡 {info_count} suggestions");
        }
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> studio_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "studio", &mut std::io::stdout());
        Ok(())
    }
}

fn init_tracing(config: &StudioConfig, explicit: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match explicit {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format.as_str() {
        "json" => builder.json().with_target(true).init(),
        "compact" => builder.compact().with_target(false).init(),
        _ => builder.with_target(false).init(),
    }
}

/// Index the passages named on the command line. With neither flag the
/// corpus is empty and docs questions are answered from the model and tools.
fn load_corpus(config: &StudioConfig, corpus: &CorpusArgs) -> studio_core::Result<Arc<dyn Retriever>> {
    let retriever = match &corpus.transcript {
        Some(path) => bootstrap::load_transcript(config, path)?,
        None if !corpus.docs.is_empty() => bootstrap::load_documents(config, corpus.docs.as_slice())?,
        None => InMemoryRetriever::default(),
    };
    Ok(Arc::new(retriever))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One-line explanation for errors the user can act on.
fn print_error(e: &StudioError) {
    eprintln!("\x1b[31m❌ {e}\x1b[0m");
    if e.is_rate_limited() {
        eprintln!("\x1b[90m   The LLM provider is rate limiting requests; retry later.\x1b[0m");
    }
}
