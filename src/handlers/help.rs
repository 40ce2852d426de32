//! Help rendering and the registry-wide command listing.
//!
//! Help templates use a small placeholder vocabulary:
//!
//! | Placeholder   | Expands to                                          |
//! |---------------|-----------------------------------------------------|
//! | `%alias%`     | the alias being described, followed by a space       |
//! | `%rights%`    | the role part of the command's mask                  |
//! | `%user%`      | the requesting user's display name                   |
//! | `%<link>%`    | a configured link URL, or the bare name with NoLinks |
//! | `%\|%`        | section break; short help is the first section       |
//!
//! Anything else between percent signs is left as written.

use super::core::registry::{COMMAND_MARKER, CommandEntry, CommandRegistry};
use super::helpers::LongMessage;
use crate::caps::{CmdFlags, CommandAuthority};
use crate::config::{HelpConfig, LimitsConfig};
use crate::handlers::ChatUser;
use std::collections::HashMap;
use tracing::debug;

/// Section break inside help templates.
pub const SECTION_BREAK: &str = "%|%";

/// Renders help text for registry entries.
#[derive(Debug, Clone, Default)]
pub struct HelpFormatter {
    link_base: Option<String>,
    links: HashMap<String, String>,
}

impl HelpFormatter {
    pub fn new(config: &HelpConfig) -> Self {
        Self {
            link_base: config.link_base.clone(),
            links: config
                .links
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
        }
    }

    /// Expand placeholders in `text`.
    pub fn expand(
        &self,
        text: &str,
        alias: &str,
        entry: &CommandEntry,
        flags: CmdFlags,
        user: &ChatUser,
    ) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut rest = text;

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let token = after
                .find('%')
                .map(|end| &after[..end])
                .filter(|t| !t.is_empty() && !t.contains(char::is_whitespace));

            match token.and_then(|t| self.placeholder(t, alias, entry, flags, user)) {
                Some(value) => {
                    out.push_str(&value);
                    // Skip token and both percent signs.
                    rest = &after[token.map_or(0, str::len) + 1..];
                }
                None => {
                    out.push('%');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn placeholder(
        &self,
        token: &str,
        alias: &str,
        entry: &CommandEntry,
        flags: CmdFlags,
        user: &ChatUser,
    ) -> Option<String> {
        let key = token.to_lowercase();
        match key.as_str() {
            "alias" => Some(format!("{alias} ")),
            "rights" => Some(flags.twitch_level().to_string()),
            "user" => Some(user.display_name.clone()),
            "command" => Some(entry.name().to_string()),
            _ => self.links.get(&key).map(|url| {
                if flags.contains(CmdFlags::NO_LINKS) {
                    token.to_string()
                } else {
                    url.clone()
                }
            }),
        }
    }

    /// Render help for `entry` as reached through `alias`.
    ///
    /// Returns `None` for a disabled or `SilentCheck` entry. Does not check
    /// whether `user` may see it; see [`can_view`](CommandAuthority::can_view).
    pub fn render(&self, entry: &CommandEntry, alias: &str, user: &ChatUser, long: bool) -> Option<String> {
        let settings = entry.settings();
        if settings.flags.intersects(CmdFlags::DISABLED | CmdFlags::SILENT_CHECK) {
            return None;
        }

        let expand = |text: &str| self.expand(text, alias, entry, settings.flags, user);

        let mut text = if long {
            settings
                .long_help
                .as_deref()
                .unwrap_or(settings.short_help.as_str())
                .split(SECTION_BREAK)
                .map(|section| expand(section).trim().to_string())
                .filter(|section| !section.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            let first = settings
                .short_help
                .split(SECTION_BREAK)
                .next()
                .unwrap_or_default();
            expand(first).trim_end().to_string()
        };

        if settings.flags.contains(CmdFlags::HELP_LINK)
            && let Some(base) = &self.link_base
        {
            let name = entry.name().trim_start_matches(COMMAND_MARKER);
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(base);
            text.push_str(name);
        }

        if text.is_empty() {
            return None;
        }
        Some(text)
    }

    /// Every alias `user` may use, as chat messages.
    ///
    /// Subcommand entries are left out. Aliases are shown without the
    /// command marker.
    #[allow(clippy::too_many_arguments)]
    pub fn command_list(
        &self,
        registry: &CommandRegistry,
        authority: &CommandAuthority<'_>,
        user: &ChatUser,
        limits: &LimitsConfig,
        header: &str,
        footer: &str,
        empty: &str,
    ) -> Vec<String> {
        let mut msg = LongMessage::new(limits).header(header);
        let mut shown: Vec<&str> = Vec::new();
        for (alias, entry) in registry.aliases() {
            let settings = entry.settings();
            if settings.flags.contains(CmdFlags::SUBCOMMAND) {
                continue;
            }
            if !authority.can_view(settings.flags, settings.allow_list.as_deref(), user) {
                continue;
            }
            // `!help` and `.help` both show as `help`.
            let name = alias.trim_start_matches(COMMAND_MARKER);
            if !shown.contains(&name) {
                shown.push(name);
                msg.add(name, " ");
            }
        }
        if msg.is_truncated() {
            debug!(shown = msg.len(), "Command listing truncated");
        }
        msg.finish(footer, empty)
    }
}
