//! Command registry: registered commands and the alias table.
//!
//! A [`CommandEntry`] is created once at startup and shared by every alias
//! that maps to it, so a flag change made through one alias is seen through
//! all of them. The mutable part of an entry (mask, help texts, allow-list
//! name) sits behind a read-write lock: the rights gate, validation and help
//! take read guards, the admin sub-protocol takes the write guard.
//!
//! The alias table itself is only written during startup registration. Once
//! the registry is wrapped in an `Arc` and handed to the router it is
//! read-only.

use super::traits::{Handler, HandlerKind};
use crate::caps::CmdFlags;
use crate::error::RegistryError;
use crate::handlers::patterns::ArgPattern;
use crate::lists::normalize_list_name;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Prefix added to every alias key.
pub const COMMAND_MARKER: char = '!';

/// Aliases registered with this prefix are stored bare (the prefix is
/// stripped and no [`COMMAND_MARKER`] is added).
pub const BARE_MARKER: char = '.';

/// Normalize an alias the way the alias table stores it.
///
/// Lower-cased; `.help` becomes `help`, `help` becomes `!help`. Returns
/// `None` for an empty alias.
pub fn normalize_alias(alias: &str) -> Option<String> {
    let alias = alias.trim().to_lowercase();
    if alias.is_empty() {
        return None;
    }
    match alias.strip_prefix(BARE_MARKER) {
        Some("") => None,
        Some(bare) => Some(bare.to_string()),
        None => Some(format!("{COMMAND_MARKER}{alias}")),
    }
}

/// The runtime-mutable part of a command.
#[derive(Debug, Clone, Default)]
pub struct EntrySettings {
    pub flags: CmdFlags,
    pub short_help: String,
    pub long_help: Option<String>,
    /// Normalized allow-list name (`friends.users`).
    pub allow_list: Option<String>,
}

/// One registered command.
pub struct CommandEntry {
    name: String,
    aliases: Vec<String>,
    handler: Option<HandlerKind>,
    pattern: ArgPattern,
    user_parameter: String,
    settings: RwLock<EntrySettings>,
    use_count: AtomicU64,
}

impl CommandEntry {
    /// Canonical name: the first alias given at registration, normalized.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases this entry owns in the alias table, in registration order.
    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[inline]
    pub fn handler(&self) -> Option<&HandlerKind> {
        self.handler.as_ref()
    }

    #[inline]
    pub fn pattern(&self) -> &ArgPattern {
        &self.pattern
    }

    /// Free-form parameter reserved for the handler.
    #[inline]
    pub fn user_parameter(&self) -> &str {
        &self.user_parameter
    }

    /// Snapshot of the mutable settings.
    pub fn settings(&self) -> EntrySettings {
        self.settings.read().clone()
    }

    #[inline]
    pub fn flags(&self) -> CmdFlags {
        self.settings.read().flags
    }

    pub fn short_help(&self) -> String {
        self.settings.read().short_help.clone()
    }

    pub fn allow_list(&self) -> Option<String> {
        self.settings.read().allow_list.clone()
    }

    /// OR `flags` into the mask. Returns the resulting mask.
    pub fn set_flags(&self, flags: CmdFlags) -> CmdFlags {
        let mut settings = self.settings.write();
        settings.flags.insert(flags);
        settings.flags
    }

    /// Remove `flags` from the mask. Returns the resulting mask.
    pub fn clear_flags(&self, flags: CmdFlags) -> CmdFlags {
        let mut settings = self.settings.write();
        settings.flags.remove(flags);
        settings.flags
    }

    pub fn set_short_help(&self, text: &str) {
        self.settings.write().short_help = text.to_string();
    }

    pub fn set_long_help(&self, text: Option<&str>) {
        self.settings.write().long_help = text.map(str::to_string);
    }

    /// Set the allow-list by name. The name is normalized here, once.
    /// Returns the normalized name.
    pub fn set_allow_list(&self, list: &str) -> String {
        let normalized = normalize_list_name(list);
        self.settings.write().allow_list = Some(normalized.clone());
        normalized
    }

    pub fn clear_allow_list(&self) {
        self.settings.write().allow_list = None;
    }

    /// Number of handler invocations so far.
    #[inline]
    pub fn use_count(&self) -> u64 {
        self.use_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_use(&self) {
        self.use_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("handler", &self.handler)
            .field("pattern", &self.pattern)
            .field("settings", &*self.settings.read())
            .finish()
    }
}

/// Registry of commands, keyed by normalized alias.
#[derive(Default)]
pub struct CommandRegistry {
    aliases: HashMap<String, Arc<CommandEntry>>,
    /// Alias keys in registration order, for listings.
    order: Vec<String>,
    entries: Vec<Arc<CommandEntry>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering a command under one or more aliases.
    pub fn command<I, S>(&mut self, aliases: I) -> CommandBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CommandBuilder {
            registry: self,
            aliases: aliases.into_iter().map(|a| a.as_ref().to_string()).collect(),
            handler: None,
            conflict: false,
            settings: EntrySettings::default(),
            pattern: ArgPattern::default(),
            user_parameter: String::new(),
        }
    }

    /// One-call registration: aliases, optional handler, mask, short help
    /// and pattern.
    pub fn add_command<I, S>(
        &mut self,
        aliases: I,
        handler: Option<HandlerKind>,
        flags: CmdFlags,
        short_help: &str,
        pattern: ArgPattern,
    ) -> Result<Arc<CommandEntry>, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = self.command(aliases).help(flags, short_help, pattern);
        if let Some(kind) = handler {
            builder = builder.bind(kind);
        }
        builder.register()
    }

    /// Look up a normalized alias key.
    #[inline]
    pub fn lookup(&self, alias: &str) -> Option<Arc<CommandEntry>> {
        self.aliases.get(alias).cloned()
    }

    /// Look up free text the way a user would type a command name: as
    /// given, then with the command marker added.
    pub fn find(&self, text: &str) -> Option<(String, Arc<CommandEntry>)> {
        let key = text.trim().to_lowercase();
        if let Some(entry) = self.lookup(&key) {
            return Some((key, entry));
        }
        let marked = format!("{COMMAND_MARKER}{key}");
        self.lookup(&marked).map(|entry| (marked, entry))
    }

    /// All `(alias, entry)` pairs in registration order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Arc<CommandEntry>)> {
        self.order
            .iter()
            .filter_map(|alias| self.aliases.get(alias).map(|e| (alias.as_str(), e)))
    }

    /// Every registered entry, once each.
    pub fn entries(&self) -> &[Arc<CommandEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Command usage statistics: `(canonical name, uses)`, used commands
    /// only, most used first.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.name().to_string(), e.use_count()))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }

    fn insert(&mut self, builder_aliases: Vec<String>, mut entry: CommandEntry) -> Arc<CommandEntry> {
        let mut owned = Vec::new();
        for alias in &builder_aliases {
            if self.aliases.contains_key(alias) || owned.contains(alias) {
                debug!(alias = %alias, command = %entry.name, "Alias already registered, skipping");
                continue;
            }
            owned.push(alias.clone());
        }

        // Every alias is taken: keep the first registration.
        if owned.is_empty()
            && let Some(existing) = builder_aliases.first().and_then(|a| self.aliases.get(a))
        {
            debug!(command = %entry.name, "All aliases already registered, ignoring command");
            return Arc::clone(existing);
        }
        entry.aliases = owned;

        let entry = Arc::new(entry);
        for alias in entry.aliases() {
            self.aliases.insert(alias.clone(), Arc::clone(&entry));
            self.order.push(alias.clone());
        }
        self.entries.push(Arc::clone(&entry));

        debug!(
            command = %entry.name,
            aliases = ?entry.aliases,
            flags = %entry.flags(),
            "Registered command"
        );
        entry
    }
}

/// Chained configuration for one command. Finish with
/// [`register`](CommandBuilder::register).
pub struct CommandBuilder<'r> {
    registry: &'r mut CommandRegistry,
    aliases: Vec<String>,
    handler: Option<HandlerKind>,
    conflict: bool,
    settings: EntrySettings,
    pattern: ArgPattern,
    user_parameter: String,
}

impl CommandBuilder<'_> {
    /// Bind a handler awaited inside dispatch.
    pub fn action(self, handler: impl Handler + 'static) -> Self {
        self.bind(HandlerKind::Inline(Arc::new(handler)))
    }

    /// Bind a handler run on its own task.
    pub fn task(self, handler: impl Handler + 'static) -> Self {
        self.bind(HandlerKind::Spawned(Arc::new(handler)))
    }

    /// Bind a handler. Binding twice makes [`register`](Self::register)
    /// fail.
    pub fn bind(mut self, kind: HandlerKind) -> Self {
        if self.handler.is_some() {
            self.conflict = true;
        } else {
            self.handler = Some(kind);
        }
        self
    }

    /// Mask, short help and validation pattern in one go.
    pub fn help(mut self, flags: CmdFlags, short_help: &str, pattern: ArgPattern) -> Self {
        self.settings.flags = flags;
        self.settings.short_help = short_help.to_string();
        self.pattern = pattern;
        self
    }

    pub fn flags(mut self, flags: CmdFlags) -> Self {
        self.settings.flags = flags;
        self
    }

    pub fn long_help(mut self, text: &str) -> Self {
        self.settings.long_help = Some(text.to_string());
        self
    }

    pub fn pattern(mut self, pattern: ArgPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn user_param(mut self, value: &str) -> Self {
        self.user_parameter = value.to_string();
        self
    }

    pub fn allow(mut self, list: &str) -> Self {
        self.settings.allow_list = Some(normalize_list_name(list));
        self
    }

    /// Create the shared entry and insert its aliases. Aliases that are
    /// empty or already taken are skipped; the first registration wins.
    pub fn register(self) -> Result<Arc<CommandEntry>, RegistryError> {
        let normalized: Vec<String> = self
            .aliases
            .iter()
            .filter_map(|a| normalize_alias(a))
            .collect();

        let Some(name) = normalized.first().cloned() else {
            return Err(RegistryError::NoAliases);
        };

        if self.conflict {
            return Err(RegistryError::HandlerConflict(name));
        }

        let entry = CommandEntry {
            name,
            aliases: Vec::new(),
            handler: self.handler,
            pattern: self.pattern,
            user_parameter: self.user_parameter,
            settings: RwLock::new(self.settings),
            use_count: AtomicU64::new(0),
        };

        Ok(self.registry.insert(normalized, entry))
    }
}
