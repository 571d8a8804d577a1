//! Pool store client.
//!
//! The store is only reachable through two calls: read a pool (or every
//! pool on the account) and replace a pool's mutable fields. Both are
//! authenticated with the account email and API key headers.

use std::fmt;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use serde_json::Value;

use lbswitch_core::{PoolId, PoolListing, PoolUpdate};

use crate::error::{ClientError, StoreFailure};
use crate::http::{agent, pretty_body};

/// User-scoped load balancer endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4/user/load_balancers";

/// Characters escaped in a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Account email + API key, sent as `X-Auth-Email` / `X-Auth-Key`.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// A decoded pool read, with the raw response kept for error reporting.
#[derive(Debug, Clone)]
pub struct FetchedPools {
    pub status: u16,
    pub body: String,
    pub listing: PoolListing,
}

/// Read and full-replace access to the remote pool configuration.
pub trait PoolStore {
    /// Fetch one pool by identifier.
    fn fetch_pool(&self, identifier: &PoolId) -> Result<FetchedPools, ClientError>;

    /// Fetch every pool visible to the credentials.
    fn fetch_pools(&self) -> Result<FetchedPools, ClientError>;

    /// Replace the pool wholesale with `update`.
    fn write_pool(&self, identifier: &PoolId, update: &PoolUpdate) -> Result<(), ClientError>;
}

// ---------------------------------------------------------------------------
// Cloudflare implementation
// ---------------------------------------------------------------------------

/// `{ success, errors, messages, result }` wrapper around every API response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "assume_success")]
    success: bool,
    result: Option<T>,
}

fn assume_success() -> bool {
    true
}

/// [`PoolStore`] over the Cloudflare v4 load balancer API.
#[derive(Debug, Clone)]
pub struct CloudflareStore {
    agent: ureq::Agent,
    base: String,
    credentials: Credentials,
}

impl CloudflareStore {
    pub fn new(base: impl Into<String>, credentials: Credentials, timeout: Duration) -> Self {
        Self::with_agent(agent(timeout), base, credentials)
    }

    pub fn with_agent(
        agent: ureq::Agent,
        base: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        let base = base.into().trim_end_matches('/').to_owned();
        Self {
            agent,
            base,
            credentials,
        }
    }

    fn pools_url(&self) -> String {
        format!("{}/pools", self.base)
    }

    fn pool_url(&self, identifier: &PoolId) -> String {
        format!(
            "{}/pools/{}",
            self.base,
            utf8_percent_encode(&identifier.0, SEGMENT)
        )
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("X-Auth-Email", &self.credentials.email)
            .set("X-Auth-Key", &self.credentials.api_key)
            .set("Content-Type", "application/json")
    }

    fn read(&self, url: &str) -> Result<FetchedPools, ClientError> {
        tracing::debug!(url, "reading pools");
        let response = self
            .authorize(self.agent.get(url))
            .call()
            .map_err(|err| ClientError::StoreRead(failure_from(err)))?;
        let (status, body) = read_success(response).map_err(ClientError::StoreRead)?;

        let envelope: Envelope<PoolListing> =
            serde_json::from_str(&body).map_err(|err| {
                ClientError::StoreRead(StoreFailure::Malformed {
                    status,
                    reason: err.to_string(),
                    body: pretty_body(&body),
                })
            })?;
        if !envelope.success {
            return Err(ClientError::StoreRead(StoreFailure::Status {
                status,
                body: pretty_body(&body),
            }));
        }
        let listing = envelope.result.ok_or_else(|| {
            ClientError::StoreRead(StoreFailure::Malformed {
                status,
                reason: "response has no result".to_owned(),
                body: pretty_body(&body),
            })
        })?;

        tracing::debug!(status, pools = listing.len(), "pool read complete");
        Ok(FetchedPools {
            status,
            body,
            listing,
        })
    }
}

impl PoolStore for CloudflareStore {
    fn fetch_pool(&self, identifier: &PoolId) -> Result<FetchedPools, ClientError> {
        self.read(&self.pool_url(identifier))
    }

    fn fetch_pools(&self) -> Result<FetchedPools, ClientError> {
        self.read(&self.pools_url())
    }

    fn write_pool(&self, identifier: &PoolId, update: &PoolUpdate) -> Result<(), ClientError> {
        let url = self.pool_url(identifier);
        tracing::debug!(url, origins = update.origins.len(), "writing pool");
        let response = self
            .authorize(self.agent.put(&url))
            .send_json(update)
            .map_err(|err| ClientError::StoreWrite(failure_from(err)))?;
        let (status, body) = read_success(response).map_err(ClientError::StoreWrite)?;

        // A 2xx with an unparseable body still means the replace was applied.
        match serde_json::from_str::<Envelope<Value>>(&body) {
            Ok(envelope) if !envelope.success => {
                Err(ClientError::StoreWrite(StoreFailure::Status {
                    status,
                    body: pretty_body(&body),
                }))
            }
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::debug!(status, error = %err, "write response was not an API envelope");
                Ok(())
            }
        }
    }
}

/// Read a response's body, rejecting anything outside 2xx.
fn read_success(response: ureq::Response) -> Result<(u16, String), StoreFailure> {
    let status = response.status();
    let body = response
        .into_string()
        .map_err(|err| StoreFailure::Transport(err.to_string()))?;
    if !(200..300).contains(&status) {
        return Err(StoreFailure::Status {
            status,
            body: pretty_body(&body),
        });
    }
    Ok((status, body))
}

fn failure_from(err: ureq::Error) -> StoreFailure {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            StoreFailure::Status {
                status,
                body: pretty_body(&body),
            }
        }
        ureq::Error::Transport(transport) => StoreFailure::Transport(transport.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
