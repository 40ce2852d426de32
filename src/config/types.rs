//! Core configuration types.

use super::{CommandBlock, HelpConfig, LimitsConfig};
use crate::error::RegistryError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid command block: {0}")]
    Registry(#[from] RegistryError),
}

/// Router configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub help: HelpConfig,
    #[serde(default)]
    pub lists: ListsConfig,
    /// Reply commands defined in the config file.
    #[serde(default)]
    pub commands: Vec<CommandBlock>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Command blocks are checked here so a bad flag name or pattern fails
    /// startup instead of surfacing at registration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        for block in &config.commands {
            block.validate()?;
        }
        Ok(config)
    }
}

/// Bot identity and output plumbing.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Capacity of the outgoing chat queue (default: 64).
    #[serde(default = "default_output_buffer")]
    pub output_buffer: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            output_buffer: default_output_buffer(),
        }
    }
}

fn default_bot_name() -> String {
    "chatgate".to_string()
}

fn default_output_buffer() -> usize {
    64
}

/// Named allow-list storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListsConfig {
    /// Directory of `*.users` files loaded once at startup.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.bot.name, "chatgate");
        assert_eq!(config.bot.output_buffer, 64);
        assert_eq!(config.limits.max_message_len, 500);
        assert!(config.lists.dir.is_none());
        assert!(config.commands.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(
            r#"
            [bot]
            name = "songbot"
            output_buffer = 16

            [limits]
            max_message_len = 120
            max_messages = 3

            [help]
            link_base = "https://example.org/commands/"

            [help.links]
            beatsaver = "https://beatsaver.com"

            [lists]
            dir = "lists"

            [[commands]]
            aliases = ["discord", "dc"]
            flags = "Everyone"
            help = "usage: %alias%"
            pattern = "nothing"
            reply = "Join us at https://discord.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.bot.name, "songbot");
        assert_eq!(config.limits.max_messages, 3);
        assert_eq!(config.help.links["beatsaver"], "https://beatsaver.com");
        assert_eq!(config.lists.dir.as_deref(), Some(Path::new("lists")));
        assert_eq!(config.commands[0].aliases, vec!["discord", "dc"]);
    }

    #[test]
    fn bad_command_flags_fail_load() {
        let result = Config::parse(
            r#"
            [[commands]]
            aliases = ["x"]
            flags = "Everyone, Wizard"
            reply = "hi"
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Registry(RegistryError::Flags { .. }))
        ));
    }

    #[test]
    fn bad_command_pattern_fails_load() {
        let result = Config::parse(
            r#"
            [[commands]]
            aliases = ["x"]
            pattern = "(unclosed"
            reply = "hi"
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Registry(RegistryError::Pattern { .. }))
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bot]\nname = \"fromfile\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bot.name, "fromfile");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
