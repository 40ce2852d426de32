//! Administrative sub-protocol.
//!
//! A broadcaster can reconfigure a live command by following its name with
//! a `/` switch, e.g. `!lookup/disable` or `!lookup/set Sub`. Changes are made
//! to the shared entry, so every alias of the command sees them at once.
//!
//! Switches that mutate the entry (or only report on it) end the dispatch;
//! the command's own handler does not run. `/silent` and `/test` strip the
//! switch and let the dispatch continue with whatever followed it. Unknown
//! switches are ordinary argument text.

use super::core::middleware::ChatSink;
use super::core::registry::CommandEntry;
use crate::caps::CmdFlags;
use crate::handlers::ChatUser;
use crate::metrics;
use tracing::{info, warn};

/// Marker that starts a switch in the argument text.
pub const SWITCH_MARKER: char = '/';

/// What the dispatcher does after the sub-protocol has run.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminOutcome {
    /// The switch was handled; stop here.
    Handled,
    /// Keep dispatching with this argument text.
    Continue(String),
}

/// Split `/switch rest` at the first space or comma. The switch is
/// lower-cased; the rest is trimmed.
pub fn split_switch(param: &str) -> (String, &str) {
    match param.find([' ', ',']) {
        Some(idx) => (param[..idx].to_lowercase(), param[idx + 1..].trim()),
        None => (param.to_lowercase(), ""),
    }
}

async fn reply(sink: &ChatSink, text: String) {
    if let Err(e) = sink.send(text).await {
        warn!(error = %e, "Failed to send admin reply");
    }
}

/// Run a switch against `entry`. The caller has already checked that the
/// user is the broadcaster and that `param` starts with [`SWITCH_MARKER`].
pub async fn run(
    entry: &CommandEntry,
    alias: &str,
    user: &ChatUser,
    param: &str,
    sink: &ChatSink,
) -> AdminOutcome {
    let (switch, rest) = split_switch(param);

    match switch.as_str() {
        "/allow" => {
            if rest.is_empty() {
                reply(sink, format!("usage: {alias}/allow <list name>")).await;
                return AdminOutcome::Handled;
            }
            let list = entry.set_allow_list(rest);
            info!(command = %entry.name(), user = %user.display_name, list = %list, "Allow-list set");
            metrics::record_admin_change("allow");
            reply(sink, format!("Permit custom userlist set to {list}.")).await;
        }
        "/disable" => {
            entry.set_flags(CmdFlags::DISABLED);
            info!(command = %entry.name(), user = %user.display_name, "Command disabled");
            metrics::record_admin_change("disable");
            reply(sink, format!("{alias} Disabled.")).await;
        }
        "/enable" => {
            entry.clear_flags(CmdFlags::DISABLED);
            info!(command = %entry.name(), user = %user.display_name, "Command enabled");
            metrics::record_admin_change("enable");
            reply(sink, format!("{alias} Enabled.")).await;
        }
        "/sethelp" => {
            if rest.is_empty() {
                reply(sink, format!("usage: {alias}/sethelp <help text>")).await;
                return AdminOutcome::Handled;
            }
            entry.set_short_help(rest);
            info!(command = %entry.name(), user = %user.display_name, "Help text replaced");
            metrics::record_admin_change("sethelp");
            reply(sink, format!("{alias} help: {rest}")).await;
        }
        "/flags" => {
            reply(sink, format!("{alias} flags: {}", entry.flags())).await;
        }
        "/set" | "/clear" => {
            let setting = switch == "/set";
            if rest.is_empty() {
                reply(sink, format!("usage: {alias}{switch} <flag>")).await;
                return AdminOutcome::Handled;
            }
            match CmdFlags::parse_list(rest) {
                Ok(flags) => {
                    let result = if setting {
                        entry.set_flags(flags)
                    } else {
                        entry.clear_flags(flags)
                    };
                    info!(
                        command = %entry.name(),
                        user = %user.display_name,
                        change = %switch,
                        flags = %flags,
                        "Command flags changed"
                    );
                    metrics::record_admin_change(if setting { "set" } else { "clear" });
                    reply(sink, format!("{alias} flags: {result}")).await;
                }
                Err(e) => {
                    warn!(command = %entry.name(), input = %rest, error = %e, "Rejected flag change");
                    reply(sink, format!("{alias}{switch}: {e}")).await;
                }
            }
        }
        "/silent" | "/test" => return AdminOutcome::Continue(rest.to_string()),
        _ => return AdminOutcome::Continue(param.to_string()),
    }

    AdminOutcome::Handled
}
