//! Command Authority - the rights gate.
//!
//! [`CommandAuthority`] is the single place that decides whether a chat user
//! may run a command. The dispatcher, the help formatter and the help
//! listing all ask it, so the role rules cannot drift apart.

use super::flags::CmdFlags;
use crate::handlers::ChatUser;
use crate::lists::UserLists;
use tracing::trace;

/// Outcome of the rights gate for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// A role bit or the allow-list matched.
    Granted,
    /// No role matched but the command carries `BypassRights`.
    Bypassed,
    /// The command is disabled; nobody gets in and nothing is reported.
    Disabled,
    /// No role matched.
    Denied,
}

impl Access {
    /// Whether the invocation may proceed past the gate.
    #[inline]
    pub fn allowed(self) -> bool {
        matches!(self, Access::Granted | Access::Bypassed)
    }
}

/// Evaluates command rights against the role bits of a mask and the
/// command's named allow-list.
pub struct CommandAuthority<'a> {
    lists: &'a dyn UserLists,
}

impl<'a> CommandAuthority<'a> {
    #[inline]
    pub fn new(lists: &'a dyn UserLists) -> Self {
        Self { lists }
    }

    /// Role check only: does any role bit in `flags` match the user?
    ///
    /// A disabled command never matches.
    pub fn has_rights(flags: CmdFlags, user: &ChatUser) -> bool {
        if flags.contains(CmdFlags::DISABLED) {
            return false;
        }
        if flags.contains(CmdFlags::EVERYONE) {
            return true;
        }
        (user.is_broadcaster && flags.contains(CmdFlags::BROADCASTER))
            || (user.is_moderator && flags.contains(CmdFlags::MODERATOR))
            || (user.is_subscriber && flags.contains(CmdFlags::SUBSCRIBER))
            || (user.is_vip && flags.contains(CmdFlags::VIP))
    }

    /// Whether the user is on the named allow-list. An unset list never
    /// matches.
    pub fn on_allow_list(&self, list: Option<&str>, user: &ChatUser) -> bool {
        match list {
            Some(list) if !list.is_empty() => self.lists.contains(list, &user.normalized_name()),
            _ => false,
        }
    }

    /// Roles or allow-list, without the `BypassRights` escape. This is the
    /// rule the help formatter uses.
    pub fn can_view(&self, flags: CmdFlags, list: Option<&str>, user: &ChatUser) -> bool {
        if flags.contains(CmdFlags::DISABLED) {
            return false;
        }
        Self::has_rights(flags, user) || self.on_allow_list(list, user)
    }

    /// Full rights gate for a dispatch.
    pub fn check(&self, command: &str, flags: CmdFlags, list: Option<&str>, user: &ChatUser) -> Access {
        if flags.contains(CmdFlags::DISABLED) {
            trace!(command = %command, user = %user.display_name, "command disabled");
            return Access::Disabled;
        }

        if Self::has_rights(flags, user) || self.on_allow_list(list, user) {
            trace!(command = %command, user = %user.display_name, "rights granted");
            return Access::Granted;
        }

        if flags.contains(CmdFlags::BYPASS_RIGHTS) {
            trace!(command = %command, user = %user.display_name, "rights bypassed");
            return Access::Bypassed;
        }

        trace!(
            command = %command,
            user = %user.display_name,
            required = %flags.twitch_level(),
            "rights denied"
        );
        Access::Denied
    }
}
