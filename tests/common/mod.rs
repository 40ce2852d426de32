//! Integration test common infrastructure.
//!
//! Provides a router harness with capturing chat output, a recording
//! handler, and user fixtures.

pub mod harness;
pub mod recorder;

#[allow(unused_imports)]
pub use harness::{TestRouter, broadcaster, moderator, subscriber, viewer, vip};
#[allow(unused_imports)]
pub use recorder::{Call, RecordingHandler};
