//! Error taxonomy for the reconciliation engine.
//!
//! Two blast radii exist: structural errors abort the run because the
//! board view is unsound (partial pagination, missing columns, broken
//! data invariants), while per-item mutation failures are caught inside
//! the reconciler loop and only recorded. The type does not encode that
//! split; the reconciler decides which errors it isolates.

use thiserror::Error;

/// Errors surfaced by the core engine and the transport collaborator.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Network-level failure from the transport layer.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The API answered with an error (HTTP status or GraphQL errors).
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code; 200 for GraphQL-level errors.
        status: u16,
        message: String,
    },

    /// Response parsed but the expected shape was absent.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A connection's fetched nodes do not cover its reported total.
    /// Operating on such a view risks duplicate cards, so this is an
    /// error, not a warning.
    #[error("{connection} not fully fetched: have {have} of {total} nodes")]
    IncompleteConnection {
        connection: String,
        have: usize,
        total: usize,
    },

    /// Column lookup by canonical name failed.
    #[error("column not found on board: {0:?}")]
    MissingColumn(String),

    /// Data-integrity violation: an item reports `closed` without a
    /// close timestamp. Never silently defaulted.
    #[error("{kind} {id} is closed but has no closedAt timestamp")]
    ClosedWithoutTimestamp { kind: &'static str, id: String },
}

impl BoardError {
    /// Wrap an arbitrary transport-layer failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BoardError::Transport(Box::new(err))
    }
}
