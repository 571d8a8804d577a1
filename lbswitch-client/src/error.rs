//! Error types for lbswitch-client.

use thiserror::Error;

use lbswitch_core::CoreError;

/// Why a single store call failed.
#[derive(Debug, Error)]
pub enum StoreFailure {
    /// The store answered with a non-2xx status, or a 2xx envelope with `success: false`.
    #[error("status code {status}\n\n{body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be decoded.
    #[error("unexpected response (status code {status}): {reason}\n\n{body}")]
    Malformed {
        status: u16,
        reason: String,
        body: String,
    },
}

impl StoreFailure {
    /// HTTP status, when the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreFailure::Status { status, .. } | StoreFailure::Malformed { status, .. } => {
                Some(*status)
            }
            StoreFailure::Transport(_) => None,
        }
    }
}

/// All errors that can arise while toggling an origin. Every one is fatal.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Required settings missing or contradictory; raised before any network call.
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("could not resolve public IPv4 address: {0}")]
    Resolution(String),

    #[error("error getting pool details: {0}")]
    StoreRead(StoreFailure),

    /// The read succeeded but nothing in it matched.
    #[error("couldn't find correct pool (store returned status code {status})\n\n{body}")]
    NotFound {
        #[source]
        source: CoreError,
        status: u16,
        body: String,
    },

    #[error("error updating pool: {0}")]
    StoreWrite(StoreFailure),

    #[error(transparent)]
    Core(#[from] CoreError),
}
