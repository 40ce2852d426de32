//! Chat line dispatch.
//!
//! [`Router::dispatch`] takes one raw chat line through these steps, any of
//! which may end the dispatch early:
//!
//! 1. Tokenize the command name (see [`ParseState::tokenize`]).
//! 2. Look up the alias. Unknown text is ordinary chat.
//! 3. Broadcaster `/switch` handling ([`admin`](super::admin)).
//! 4. Rights gate.
//! 5. `?` help request, then `/current` / `/prev` argument rewrite.
//! 6. Argument pattern check; a mismatch shows short help.
//! 7. Handler invocation. Failures and panics are logged, never returned.

use super::admin::{self, AdminOutcome, SWITCH_MARKER, split_switch};
use super::core::context::{ChatUser, Context};
use super::core::middleware::ChatSink;
use super::core::registry::{CommandEntry, CommandRegistry};
use super::core::traits::Handler;
use super::help::HelpFormatter;
use crate::caps::{Access, CmdFlags, CommandAuthority};
use crate::config::{Config, LimitsConfig};
use crate::error::HistoryError;
use crate::history::SongHistory;
use crate::lists::UserLists;
use crate::metrics;
use crate::telemetry::{CommandTimer, spans};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, warn};

/// Argument switches that pull a song version from play history.
const POSITIONAL: &[(&str, usize)] = &[("/current", 0), ("/prev", 1), ("/previous", 1)];

/// One tokenized chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    /// Lower-cased command token, including any marker typed (`!add`).
    pub command: String,
    /// Remaining text after the command and the spaces that follow it.
    pub param: String,
}

impl ParseState {
    /// Split a chat line into command token and argument text.
    ///
    /// The command ends at the first digit, `/` or space, so `!add4334-333`
    /// yields `!add` and `4334-333`. Returns `None` when the token is empty,
    /// which is the normal case for chat that is not a command.
    pub fn tokenize(line: &str) -> Option<Self> {
        let end = line
            .find(|c: char| c.is_ascii_digit() || c == SWITCH_MARKER || c == ' ')
            .unwrap_or(line.len());
        if end == 0 {
            return None;
        }

        let command = line[..end].to_lowercase();
        let param = line[end..].trim_start_matches(' ').trim_end().to_string();
        Some(Self { command, param })
    }
}

/// Routes chat lines to registered commands.
///
/// Cheap to clone; every handler context carries one.
#[derive(Clone)]
pub struct Router {
    registry: Arc<CommandRegistry>,
    lists: Arc<dyn UserLists>,
    history: Arc<dyn SongHistory>,
    help: Arc<HelpFormatter>,
    limits: Arc<LimitsConfig>,
}

impl Router {
    /// Freeze `registry` and build a router around it.
    pub fn new(
        registry: CommandRegistry,
        lists: Arc<dyn UserLists>,
        history: Arc<dyn SongHistory>,
        help: HelpFormatter,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            lists,
            history,
            help: Arc::new(help),
            limits: Arc::new(limits),
        }
    }

    /// Build a router with help and limits taken from `config`.
    pub fn from_config(
        registry: CommandRegistry,
        config: &Config,
        lists: Arc<dyn UserLists>,
        history: Arc<dyn SongHistory>,
    ) -> Self {
        Self::new(
            registry,
            lists,
            history,
            HelpFormatter::new(&config.help),
            config.limits.clone(),
        )
    }

    #[inline]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    #[inline]
    pub fn help(&self) -> &HelpFormatter {
        &self.help
    }

    #[inline]
    pub fn lists(&self) -> &dyn UserLists {
        self.lists.as_ref()
    }

    #[inline]
    pub fn history(&self) -> &dyn SongHistory {
        self.history.as_ref()
    }

    #[inline]
    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Rights gate bound to this router's allow-lists.
    #[inline]
    pub fn authority(&self) -> CommandAuthority<'_> {
        CommandAuthority::new(self.lists.as_ref())
    }

    /// Dispatch one chat line from `user`.
    ///
    /// `flags` and `info` are passed through to the handler untouched.
    /// Replies go to `sink`. Never fails: problems are reported in chat or
    /// logged.
    pub async fn dispatch(&self, user: &ChatUser, line: &str, flags: CmdFlags, info: &str, sink: &ChatSink) {
        let Some(state) = ParseState::tokenize(line) else {
            return;
        };
        let Some(entry) = self.registry.lookup(&state.command) else {
            return;
        };

        let span = spans::command(&state.command, &user.display_name, user.is_broadcaster);
        self.run(state, entry, user, flags, info, sink)
            .instrument(span)
            .await;
    }

    async fn run(
        &self,
        state: ParseState,
        entry: Arc<CommandEntry>,
        user: &ChatUser,
        flags: CmdFlags,
        info: &str,
        sink: &ChatSink,
    ) {
        let _timer = CommandTimer::new(entry.name());
        let alias = state.command;
        let mut param = state.param;

        if user.is_broadcaster && param.starts_with(SWITCH_MARKER) {
            match admin::run(&entry, &alias, user, &param, sink).await {
                AdminOutcome::Handled => return,
                AdminOutcome::Continue(rest) => param = rest,
            }
        }

        let settings = entry.settings();
        if settings.flags.contains(CmdFlags::SUBCOMMAND) {
            debug!("Subcommand cannot be invoked directly");
            return;
        }

        match self
            .authority()
            .check(&alias, settings.flags, settings.allow_list.as_deref(), user)
        {
            Access::Granted | Access::Bypassed => {}
            Access::Disabled => {
                debug!("Command disabled");
                return;
            }
            Access::Denied => {
                metrics::record_denied(entry.name());
                if !settings
                    .flags
                    .intersects(CmdFlags::SILENT_PREFLIGHT | CmdFlags::SILENT_CHECK)
                {
                    self.send(
                        sink,
                        format!("{alias} is restricted to {}", settings.flags.twitch_level()),
                    )
                    .await;
                }
                return;
            }
        }

        if param == "?" {
            if let Some(text) = self.help.render(&entry, &alias, user, true) {
                self.send(sink, text).await;
            }
            return;
        }

        if param.starts_with(SWITCH_MARKER) {
            let (switch, _) = split_switch(&param);
            if let Some((_, position)) = POSITIONAL.iter().find(|(name, _)| *name == switch) {
                match self.history.version_at(*position) {
                    Ok(Some(version)) => {
                        debug!(switch = %switch, version = %version, "Argument taken from history");
                        param = version;
                    }
                    Ok(None) => {
                        debug!(switch = %switch, "History entry has no version");
                        param = String::new();
                    }
                    Err(HistoryError::OutOfRange(_)) => {
                        self.send(sink, format!("There is no {switch} song available."))
                            .await;
                        return;
                    }
                }
            }
        }

        if !entry.pattern().is_match(&param) {
            debug!(param = %param, pattern = ?entry.pattern(), "Argument rejected");
            metrics::record_validation_failed(entry.name());
            if let Some(text) = self.help.render(&entry, &alias, user, false) {
                self.send(sink, text).await;
            }
            return;
        }

        let Some(kind) = entry.handler().cloned() else {
            debug!("No handler bound");
            return;
        };

        entry.record_use();
        if settings.flags.contains(CmdFlags::LOG) {
            info!(param = %param, "Command invoked");
        }

        let ctx = Context {
            entry: Arc::clone(&entry),
            alias,
            user: user.clone(),
            param,
            flags,
            info: info.to_string(),
            sender: sink.clone(),
            router: self.clone(),
        };

        let handler = Arc::clone(kind.handler());
        if kind.is_spawned() {
            tokio::spawn(invoke(handler, ctx).instrument(spans::spawned(entry.name())));
        } else {
            invoke(handler, ctx).await;
        }
    }

    async fn send(&self, sink: &ChatSink, text: String) {
        if let Err(e) = sink.send(text).await {
            warn!(error = %e, "Failed to send chat reply");
        }
    }
}

/// Run a handler, absorbing its errors and panics.
async fn invoke(handler: Arc<dyn Handler>, ctx: Context) {
    let result = AssertUnwindSafe(handler.handle(&ctx)).catch_unwind().await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(command = %ctx.entry.name(), param = %ctx.param, error = %e, "Command handler failed");
            metrics::record_command_error(ctx.entry.name(), e.error_code());
        }
        Err(panic) => {
            error!(
                command = %ctx.entry.name(),
                param = %ctx.param,
                panic = %panic_message(panic.as_ref()),
                "Command handler panicked"
            );
            metrics::record_command_error(ctx.entry.name(), "panic");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
