//! Command capability mask.
//!
//! A [`CmdFlags`] value says which roles may run a command and how the
//! command behaves. The low six bits are the Twitch role bits and are
//! collected in [`CmdFlags::TWITCH_LEVEL`]; everything above them is a
//! behavior modifier and is never shown in "restricted to" replies.
//!
//! Flags are parsed from text through an explicit name table so that the
//! `/set` and `/clear` admin switches and the config file share one
//! vocabulary.

use crate::error::FlagParseError;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Capability and behavior bits for a registered command.
    pub struct CmdFlags: u32 {
        const EVERYONE = 1;
        const SUBSCRIBER = 1 << 1;
        const MODERATOR = 1 << 2;
        const BROADCASTER = 1 << 3;
        const VIP = 1 << 4;
        /// Members of the command's allow-list may use it as well.
        const USER_LIST = 1 << 5;
        const TWITCH_LEVEL = Self::EVERYONE.bits
            | Self::SUBSCRIBER.bits
            | Self::MODERATOR.bits
            | Self::BROADCASTER.bits
            | Self::VIP.bits
            | Self::USER_LIST.bits;

        const SHOW_RESTRICTIONS = 1 << 6;
        /// Skip the rights gate; the handler does its own checks.
        const BYPASS_RIGHTS = 1 << 7;
        /// No reply when the rights gate fails.
        const SILENT_PREFLIGHT = 1 << 8;
        const HELP_LINK = 1 << 9;
        const WHISPER_REPLY = 1 << 10;
        const TIMEOUT = 1 << 11;
        const TIMEOUT_SUB = 1 << 12;
        const TIMEOUT_VIP = 1 << 13;
        const TIMEOUT_MOD = 1 << 14;
        const NO_LINKS = 1 << 15;
        const VERBOSE = 1 << 17;
        const LOG = 1 << 18;
        const REGEX = 1 << 19;
        const USER_FLAG1 = 1 << 20;
        const USER_FLAG2 = 1 << 21;
        const USER_FLAG3 = 1 << 22;
        const USER_FLAG4 = 1 << 23;
        const MOVE_TO_TOP = 1 << 25;
        const SILENT_CHECK = 1 << 26;
        const SILENT_ERROR = 1 << 27;
        const SILENT_RESULT = 1 << 28;
        const SILENT = Self::SILENT_CHECK.bits | Self::SILENT_ERROR.bits | Self::SILENT_RESULT.bits;
        /// Only reachable from inside another command.
        const SUBCOMMAND = 1 << 29;
        const DISABLED = 1 << 30;

        // Registration presets.
        const BROADCASTER_ONLY = Self::BROADCASTER.bits;
        const MOD = Self::BROADCASTER.bits | Self::MODERATOR.bits;
        const HELP = Self::BYPASS_RIGHTS.bits;
    }
}

impl Default for CmdFlags {
    fn default() -> Self {
        CmdFlags::BROADCASTER_ONLY
    }
}

/// Single-bit names in ascending bit order. Used for rendering.
const BIT_NAMES: &[(&str, CmdFlags)] = &[
    ("Everyone", CmdFlags::EVERYONE),
    ("Sub", CmdFlags::SUBSCRIBER),
    ("Mod", CmdFlags::MODERATOR),
    ("Broadcaster", CmdFlags::BROADCASTER),
    ("VIP", CmdFlags::VIP),
    ("UserList", CmdFlags::USER_LIST),
    ("ShowRestrictions", CmdFlags::SHOW_RESTRICTIONS),
    ("BypassRights", CmdFlags::BYPASS_RIGHTS),
    ("SilentPreflight", CmdFlags::SILENT_PREFLIGHT),
    ("HelpLink", CmdFlags::HELP_LINK),
    ("WhisperReply", CmdFlags::WHISPER_REPLY),
    ("Timeout", CmdFlags::TIMEOUT),
    ("TimeoutSub", CmdFlags::TIMEOUT_SUB),
    ("TimeoutVIP", CmdFlags::TIMEOUT_VIP),
    ("TimeoutMod", CmdFlags::TIMEOUT_MOD),
    ("NoLinks", CmdFlags::NO_LINKS),
    ("Verbose", CmdFlags::VERBOSE),
    ("Log", CmdFlags::LOG),
    ("RegEx", CmdFlags::REGEX),
    ("UserFlag1", CmdFlags::USER_FLAG1),
    ("UserFlag2", CmdFlags::USER_FLAG2),
    ("UserFlag3", CmdFlags::USER_FLAG3),
    ("UserFlag4", CmdFlags::USER_FLAG4),
    ("MoveToTop", CmdFlags::MOVE_TO_TOP),
    ("SilentCheck", CmdFlags::SILENT_CHECK),
    ("SilentError", CmdFlags::SILENT_ERROR),
    ("SilentResult", CmdFlags::SILENT_RESULT),
    ("Subcommand", CmdFlags::SUBCOMMAND),
    ("Disabled", CmdFlags::DISABLED),
];

/// Names accepted on input that are not single bits (composites and
/// alternate spellings). Matched case-insensitively.
const EXTRA_NAMES: &[(&str, CmdFlags)] = &[
    ("Subscriber", CmdFlags::SUBSCRIBER),
    ("Moderator", CmdFlags::MODERATOR),
    ("TwitchLevel", CmdFlags::TWITCH_LEVEL),
    ("QuietFail", CmdFlags::SILENT_PREFLIGHT),
    ("Silent", CmdFlags::SILENT),
    ("BroadcasterOnly", CmdFlags::BROADCASTER_ONLY),
    ("Help", CmdFlags::HELP),
    ("Subcmd", CmdFlags::SUBCOMMAND),
    ("None", CmdFlags::empty()),
];

impl CmdFlags {
    /// The role sub-mask, safe to show to users.
    #[inline]
    pub fn twitch_level(self) -> CmdFlags {
        self & CmdFlags::TWITCH_LEVEL
    }

    /// Look up a single flag name.
    pub fn from_name(name: &str) -> Result<CmdFlags, FlagParseError> {
        BIT_NAMES
            .iter()
            .chain(EXTRA_NAMES)
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, f)| *f)
            .ok_or_else(|| FlagParseError::Unknown(name.to_string()))
    }

    /// Parse a list of flag names separated by commas, spaces or `|`.
    ///
    /// Every name must be known; the result is the union of all of them.
    pub fn parse_list(text: &str) -> Result<CmdFlags, FlagParseError> {
        let mut names = text
            .split(|c: char| c == ',' || c == '|' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .peekable();

        if names.peek().is_none() {
            return Err(FlagParseError::Empty);
        }

        names.try_fold(CmdFlags::empty(), |acc, name| {
            Ok(acc | CmdFlags::from_name(name)?)
        })
    }
}

impl std::str::FromStr for CmdFlags {
    type Err = FlagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CmdFlags::parse_list(s)
    }
}

impl fmt::Display for CmdFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }

        let silent = self.contains(CmdFlags::SILENT);
        let mut first = true;
        for (name, bit) in BIT_NAMES {
            if !self.contains(*bit) {
                continue;
            }
            if silent && CmdFlags::SILENT.contains(*bit) {
                if *bit != CmdFlags::SILENT_CHECK {
                    continue;
                }
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str("Silent")?;
                first = false;
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
