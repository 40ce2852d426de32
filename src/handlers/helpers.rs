//! Helpers shared by command handlers.

pub mod long_message;

pub use long_message::LongMessage;
