//! Chat command handling.
//!
//! A chat line flows through [`Router::dispatch`]: it is tokenized, the
//! command is looked up in the [`CommandRegistry`], the broadcaster's admin
//! switches are applied, the rights gate and argument pattern are checked and
//! finally the bound [`Handler`] runs.

pub mod admin;
pub mod builtin;
mod core;
mod dispatch;
pub mod help;
pub mod helpers;
mod patterns;

pub use self::core::{
    BARE_MARKER, COMMAND_MARKER, ChatSink, ChatUser, CommandBuilder, CommandEntry,
    CommandRegistry, Context, EntrySettings, Handler, HandlerKind, normalize_alias,
};
pub use dispatch::{ParseState, Router};
pub use help::HelpFormatter;
pub use patterns::ArgPattern;
