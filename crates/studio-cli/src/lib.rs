//! # studio-cli
//!
//! Command-line interface for the studio orchestrator.
//!
//! ## Commands
//!
//! - `studio ask`: Answer one question in a mode (docs, video, product, research)
//! - `studio chat`: Interactive conversation with session history
//! - `studio memory`: Inspect and curate per-user memory
//! - `studio sessions`: List, show, or delete chat sessions
//! - `studio config`: Show configuration
//! - `studio doctor`: Validate configuration
//! - `studio init`: Write a starter studio.toml

pub mod commands;

pub use commands::Cli;
