//! Chat output sink.
//!
//! Supports both direct forwarding to the chat transport and capturing for
//! tests and script runners.
//!
//! # Ordering
//!
//! Messages sent through one sink arrive in send order. A dispatch awaits
//! each send before the next, so replies from a single command keep their
//! relative order.
//!
//! # Slow transport
//!
//! When the outgoing queue stays full for [`SEND_TIMEOUT`], the message is
//! dropped and [`HandlerError::OutputTimeout`] is returned.

use crate::error::HandlerError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Timeout for attempting to send to a stalled transport before giving up.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for chat messages produced by the router and its handlers.
/// Direct forwards to the transport queue; Capturing buffers in memory.
#[derive(Clone, Debug)]
pub enum ChatSink {
    Direct(mpsc::Sender<String>),
    Capturing(Arc<Mutex<Vec<String>>>),
}

impl ChatSink {
    /// A capturing sink plus a handle to read what was sent.
    pub fn capturing() -> (Self, Arc<Mutex<Vec<String>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (Self::Capturing(Arc::clone(&buf)), buf)
    }

    /// Send or buffer a message depending on sink mode.
    pub async fn send(&self, text: impl Into<String>) -> Result<(), HandlerError> {
        let text = text.into();
        match self {
            Self::Direct(tx) => match tokio::time::timeout(SEND_TIMEOUT, tx.send(text)).await {
                Ok(Ok(())) => {
                    crate::metrics::record_message_sent();
                    Ok(())
                }
                Ok(Err(_)) => Err(HandlerError::OutputClosed),
                Err(_timeout) => {
                    tracing::warn!(
                        "Chat output stalled (timeout after {:?}), message dropped",
                        SEND_TIMEOUT
                    );
                    Err(HandlerError::OutputTimeout)
                }
            },
            Self::Capturing(buf) => {
                buf.lock().await.push(text);
                Ok(())
            }
        }
    }

    /// Send several messages in order, stopping at the first failure.
    pub async fn send_all<I>(&self, messages: I) -> Result<(), HandlerError>
    where
        I: IntoIterator<Item = String>,
    {
        for msg in messages {
            self.send(msg).await?;
        }
        Ok(())
    }
}
