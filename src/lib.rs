//! chatgate - chat command router for live streams.
//!
//! Tokenizes chat lines, checks the sender against each command's capability
//! mask, validates the argument text and runs the bound handler. Broadcasters
//! can reconfigure commands live through `/` switches.

pub mod caps;
pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod lists;
pub mod metrics;
pub mod telemetry;

pub use caps::{Access, CmdFlags, CommandAuthority};
pub use config::Config;
pub use error::{HandlerError, HandlerResult, RegistryError};
pub use handlers::{
    ArgPattern, ChatSink, ChatUser, CommandRegistry, Context, Handler, HandlerKind, Router,
};
