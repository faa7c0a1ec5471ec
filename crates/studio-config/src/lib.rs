//! # studio-config
//!
//! Configuration for the studio orchestrator. Reads `studio.toml`, then applies
//! environment variable overrides, then validates.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::StudioConfig;
pub use schema::{ConfigWarning, WarningSeverity, data_dir, expand_home};
