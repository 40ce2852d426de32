//! Core handler infrastructure.
//!
//! This module contains the fundamental types of the command system: the
//! registry and its shared entries, the handler trait, the per-invocation
//! context and the chat output sink.

pub mod context;
pub mod middleware;
pub mod registry;
pub mod traits;

// Re-export commonly used types
pub use context::{ChatUser, Context};
pub use middleware::ChatSink;
pub use registry::{
    BARE_MARKER, COMMAND_MARKER, CommandBuilder, CommandEntry, CommandRegistry, EntrySettings,
    normalize_alias,
};
pub use traits::{Handler, HandlerKind};
