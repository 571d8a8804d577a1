//! lbswitch core library — pool/origin types, pool lookup, origin reconciliation.
//!
//! Nothing in this crate performs I/O:
//! - [`types`] — newtypes and store documents
//! - [`error`] — [`CoreError`]
//! - [`locate`] — pick one pool out of a store listing
//! - [`reconcile`] — compute the origin list to write back

pub mod error;
pub mod locate;
pub mod reconcile;
pub mod types;

pub use error::CoreError;
pub use locate::{locate, PoolSelector};
pub use reconcile::{reconcile, OriginChange, Reconciled};
pub use types::{
    Intent, LookupMode, Origin, OriginAddress, PoolDocument, PoolId, PoolListing, PoolName,
    PoolUpdate,
};
