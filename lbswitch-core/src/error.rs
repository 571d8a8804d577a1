//! Error types for lbswitch-core.

use thiserror::Error;

/// All errors that can arise from parsing inputs, pool lookup, or reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Neither a pool identifier nor a pool name was supplied.
    #[error("a pool identifier or pool name is required")]
    MissingSelector,

    /// The store answered, but no pool in the listing matched.
    #[error("no pool matched {selector}")]
    PoolNotFound { selector: String },

    /// Address text that is not a dotted-quad IPv4 address.
    #[error("'{input}' is not a dotted-quad IPv4 address")]
    InvalidAddress { input: String },

    #[error("invalid command '{input}'; expected: register, deregister")]
    InvalidIntent { input: String },

    #[error("unknown lookup mode '{input}'; expected: auto, direct, scan")]
    InvalidLookupMode { input: String },
}
