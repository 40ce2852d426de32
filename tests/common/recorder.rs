//! Handler that records every invocation.

use async_trait::async_trait;
use chatgate::{CmdFlags, Context, Handler, HandlerError, HandlerResult};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One recorded handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub alias: String,
    pub user: String,
    pub param: String,
    pub flags: CmdFlags,
    pub info: String,
}

/// Records calls and optionally replies, fails or panics.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<Call>>>,
    reply: Option<String>,
    fail: bool,
    panic: bool,
}

#[allow(dead_code)]
impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` (placeholders expanded) on every call.
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Return an error after recording.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Panic after recording.
    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn handle(&self, ctx: &Context) -> HandlerResult {
        self.calls.lock().await.push(Call {
            alias: ctx.alias.clone(),
            user: ctx.user.display_name.clone(),
            param: ctx.param.clone(),
            flags: ctx.flags,
            info: ctx.info.clone(),
        });

        if self.panic {
            panic!("handler blew up");
        }
        if self.fail {
            return Err(HandlerError::Internal("lookup service unavailable".into()));
        }
        if let Some(text) = &self.reply {
            ctx.reply(ctx.expand(text)).await?;
        }
        Ok(())
    }
}
