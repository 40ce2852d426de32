//! Command handler trait and binding modes.
//!
//! Every command handler implements the single [`Handler`] trait. How it is
//! run is chosen when the command is registered:
//!
//! - [`HandlerKind::Inline`]: awaited inside the dispatch call. Use for
//!   handlers that only reply or touch in-memory state.
//! - [`HandlerKind::Spawned`]: moved into its own tokio task so a slow
//!   external lookup never holds up dispatch of unrelated commands.
//!
//! A command binds at most one handler; binding a second is rejected at
//! registration time.

use super::context::Context;
use crate::error::HandlerResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A command implementation.
///
/// # Example
///
/// ```ignore
/// pub struct QueueHandler;
///
/// #[async_trait]
/// impl Handler for QueueHandler {
///     async fn handle(&self, ctx: &Context) -> HandlerResult {
///         ctx.reply("Queue is empty.").await
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context) -> HandlerResult;
}

/// A bound handler and how the dispatcher runs it.
#[derive(Clone)]
pub enum HandlerKind {
    Inline(Arc<dyn Handler>),
    Spawned(Arc<dyn Handler>),
}

impl HandlerKind {
    #[inline]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        match self {
            Self::Inline(h) | Self::Spawned(h) => h,
        }
    }

    #[inline]
    pub fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned(_))
    }
}

impl fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline"),
            Self::Spawned(_) => f.write_str("Spawned"),
        }
    }
}
