//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BotConfig, ListsConfig)
//! - [`limits`]: Chat output limits (LimitsConfig)
//! - [`help`]: Help rendering settings (HelpConfig)
//! - [`commands`]: Config-defined reply commands (CommandBlock)

mod commands;
mod help;
mod limits;
mod types;

pub use commands::CommandBlock;
pub use help::HelpConfig;
pub use limits::LimitsConfig;
pub use types::{BotConfig, Config, ConfigError, ListsConfig};
