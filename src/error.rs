//! Unified error handling for chatgate.
//!
//! Nothing in here ever escapes [`Router::dispatch`](crate::handlers::Router::dispatch):
//! user-facing failures become a single chat reply (or none when silenced),
//! internal ones are only logged.

use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors a command handler can return.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("chat output closed")]
    OutputClosed,

    #[error("chat output timed out")]
    OutputTimeout,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OutputClosed => "output_closed",
            Self::OutputTimeout => "output_timeout",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Flag parsing
// ============================================================================

/// Errors from the flag name table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagParseError {
    #[error("no flag given")]
    Empty,

    #[error("unknown flag: {0}")]
    Unknown(String),
}

// ============================================================================
// Registration
// ============================================================================

/// Errors raised while registering commands at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// More than one handler shape was bound to the same command.
    #[error("command {0} binds more than one handler")]
    HandlerConflict(String),

    #[error("command has no usable alias")]
    NoAliases,

    #[error("invalid pattern for {command}: {source}")]
    Pattern {
        command: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid flags for {command}: {source}")]
    Flags {
        command: String,
        #[source]
        source: FlagParseError,
    },
}

// ============================================================================
// Collaborators
// ============================================================================

/// Errors from the request history collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("no song at history position {0}")]
    OutOfRange(usize),
}
