//! Public address resolution.

use std::time::Duration;

use lbswitch_core::OriginAddress;

use crate::error::ClientError;
use crate::http::agent;

/// Plain-text IPv4 echo service.
pub const DEFAULT_RESOLVER_URL: &str = "https://api.ipify.org";

/// Source of this machine's public IPv4 address.
pub trait AddressResolver {
    fn resolve(&self) -> Result<OriginAddress, ClientError>;
}

/// Asks an address-echo service which address our request came from.
///
/// The service must answer with the bare dotted quad in the body.
#[derive(Debug, Clone)]
pub struct EchoResolver {
    agent: ureq::Agent,
    url: String,
}

impl EchoResolver {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_agent(agent(timeout), url)
    }

    pub fn with_agent(agent: ureq::Agent, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }
}

impl AddressResolver for EchoResolver {
    fn resolve(&self) -> Result<OriginAddress, ClientError> {
        tracing::debug!(url = %self.url, "resolving public address");
        let body = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|err| ClientError::Resolution(err.to_string()))?
            .into_string()
            .map_err(|err| ClientError::Resolution(err.to_string()))?;

        body.parse::<OriginAddress>()
            .map_err(|err| ClientError::Resolution(err.to_string()))
    }
}
