//! # lbswitch-client
//!
//! Network side of lbswitch: public address resolution, the pool store
//! client, and the sequential resolve → read → reconcile → write pipeline.
//!
//! Call [`pipeline::run`] with an [`AddressResolver`] and a [`PoolStore`].

pub mod error;
pub mod http;
pub mod pipeline;
pub mod resolver;
pub mod store;

pub use error::{ClientError, StoreFailure};
pub use pipeline::{Progress, RunConfig, RunOutcome};
pub use resolver::{AddressResolver, EchoResolver};
pub use store::{CloudflareStore, Credentials, FetchedPools, PoolStore};
