//! Command handler context and the chat user.
//!
//! Defines the [`Context`] passed to every handler. A context is fully owned
//! so that it can move into a spawned task for long-running handlers.

use super::middleware::ChatSink;
use super::registry::CommandEntry;
use crate::caps::CmdFlags;
use crate::error::HandlerError;
use crate::handlers::Router;
use serde::Deserialize;
use std::sync::Arc;

/// The sender of a chat line, as reported by the chat transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatUser {
    pub display_name: String,
    #[serde(default)]
    pub is_broadcaster: bool,
    #[serde(default)]
    pub is_moderator: bool,
    #[serde(default)]
    pub is_subscriber: bool,
    #[serde(default)]
    pub is_vip: bool,
}

impl ChatUser {
    /// A user with no roles.
    pub fn viewer(name: &str) -> Self {
        Self {
            display_name: name.to_string(),
            ..Default::default()
        }
    }

    /// The channel owner.
    pub fn broadcaster(name: &str) -> Self {
        Self {
            display_name: name.to_string(),
            is_broadcaster: true,
            ..Default::default()
        }
    }

    pub fn moderator(name: &str) -> Self {
        Self {
            display_name: name.to_string(),
            is_moderator: true,
            ..Default::default()
        }
    }

    pub fn subscriber(name: &str) -> Self {
        Self {
            display_name: name.to_string(),
            is_subscriber: true,
            ..Default::default()
        }
    }

    /// Key used for allow-list lookups.
    #[inline]
    pub fn normalized_name(&self) -> String {
        self.display_name.to_lowercase()
    }
}

/// Handler context for one invocation.
pub struct Context {
    /// The resolved command entry (shared with every alias).
    pub entry: Arc<CommandEntry>,
    /// The alias the user typed, normalized (e.g. `!find`).
    pub alias: String,
    /// Who sent the line.
    pub user: ChatUser,
    /// Argument text after local rewrites and validation.
    pub param: String,
    /// Flags supplied by the caller of `dispatch` (not the entry's mask).
    pub flags: CmdFlags,
    /// Free-form info supplied by the caller of `dispatch`.
    pub info: String,
    /// Where replies go.
    pub sender: ChatSink,
    /// The router that dispatched this command.
    pub router: Router,
}

impl Context {
    /// Send one chat message.
    #[inline]
    pub async fn reply(&self, text: impl Into<String>) -> Result<(), HandlerError> {
        self.sender.send(text).await
    }

    /// Expand help placeholders (`%alias%`, `%user%`, link names...) in
    /// `text` on behalf of this invocation.
    pub fn expand(&self, text: &str) -> String {
        let flags = self.entry.flags();
        self.router
            .help()
            .expand(text, &self.alias, &self.entry, flags, &self.user)
    }
}
