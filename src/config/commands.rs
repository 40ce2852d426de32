//! Config-defined reply commands.

use crate::caps::CmdFlags;
use crate::error::RegistryError;
use crate::handlers::ArgPattern;
use serde::Deserialize;

/// A `[[commands]]` block: a command that answers with fixed text.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandBlock {
    pub aliases: Vec<String>,
    /// Flag names, e.g. `"Mod, Sub"` (default: `Broadcaster`).
    #[serde(default = "default_flags")]
    pub flags: String,
    /// Short help template.
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub long_help: Option<String>,
    /// Named pattern or raw regex (default: `anything`).
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Reply text; help placeholders are expanded per invocation.
    pub reply: String,
    /// Allow-list granting access in addition to the flags.
    #[serde(default)]
    pub allow: Option<String>,
}

fn default_flags() -> String {
    "Broadcaster".to_string()
}

fn default_pattern() -> String {
    "anything".to_string()
}

impl CommandBlock {
    /// Name used in error reports.
    pub fn label(&self) -> String {
        self.aliases.first().cloned().unwrap_or_default()
    }

    pub fn parsed_flags(&self) -> Result<CmdFlags, RegistryError> {
        CmdFlags::parse_list(&self.flags).map_err(|source| RegistryError::Flags {
            command: self.label(),
            source,
        })
    }

    pub fn parsed_pattern(&self) -> Result<ArgPattern, RegistryError> {
        ArgPattern::parse(&self.pattern).map_err(|source| RegistryError::Pattern {
            command: self.label(),
            source,
        })
    }

    /// Check flags and pattern without registering anything.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.aliases.iter().all(|a| a.trim().is_empty()) {
            return Err(RegistryError::NoAliases);
        }
        self.parsed_flags()?;
        self.parsed_pattern()?;
        Ok(())
    }
}
