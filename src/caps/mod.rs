//! Command capabilities.
//!
//! Two parts:
//!
//! 1. **[`CmdFlags`](flags::CmdFlags)** - the capability mask carried by
//!    every registered command: role bits plus behavior modifiers.
//! 2. **[`CommandAuthority`](authority::CommandAuthority)** - the rights
//!    gate. Evaluates a mask and an allow-list against a chat user.
//!
//! All rights decisions go through the authority; handlers never test role
//! bits directly.

mod authority;
mod flags;

pub use authority::{Access, CommandAuthority};
pub use flags::CmdFlags;
