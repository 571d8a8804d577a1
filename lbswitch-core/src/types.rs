//! Domain types for load-balancer pools and their origins.
//!
//! Store documents keep every field this tool does not interpret in a
//! flattened `extra` map, so a document read from the store can be written
//! back without losing data.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Weight given to every origin this tool creates.
pub const NEW_ORIGIN_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed pool identifier, as issued by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolId(pub String);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PoolId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PoolId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A human-readable pool name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolName(pub String);

impl fmt::Display for PoolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PoolName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PoolName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The machine's resolved public IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginAddress(Ipv4Addr);

impl OriginAddress {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self(ip)
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }

    /// Origin label used when no override is given: `203.0.113.7` → `203_0_113_7`.
    pub fn default_origin_name(&self) -> String {
        self.0.to_string().replace('.', "_")
    }
}

impl fmt::Display for OriginAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Ipv4Addr> for OriginAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl FromStr for OriginAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Self)
            .map_err(|_| CoreError::InvalidAddress {
                input: s.trim().to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the caller wants for this machine's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Register,
    Deregister,
}

impl Intent {
    /// The `enabled` flag an origin carries under this intent.
    pub fn enabled(self) -> bool {
        matches!(self, Intent::Register)
    }

    pub fn label(self) -> &'static str {
        match self {
            Intent::Register => "register",
            Intent::Deregister => "deregister",
        }
    }

    /// Present participle for progress headings ("Registering", "Deregistering").
    pub fn gerund(self) -> &'static str {
        match self {
            Intent::Register => "Registering",
            Intent::Deregister => "Deregistering",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "register" => Ok(Intent::Register),
            "deregister" => Ok(Intent::Deregister),
            _ => Err(CoreError::InvalidIntent {
                input: s.to_owned(),
            }),
        }
    }
}

/// How the pool is read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// `Direct` when an identifier is known, otherwise `Scan`.
    #[default]
    Auto,
    /// Fetch one pool by identifier; the store narrows the result.
    Direct,
    /// List every pool on the account and match by identifier or name.
    Scan,
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMode::Auto => write!(f, "auto"),
            LookupMode::Direct => write!(f, "direct"),
            LookupMode::Scan => write!(f, "scan"),
        }
    }
}

impl FromStr for LookupMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(LookupMode::Auto),
            "direct" => Ok(LookupMode::Direct),
            "scan" => Ok(LookupMode::Scan),
            _ => Err(CoreError::InvalidLookupMode {
                input: s.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Store documents
// ---------------------------------------------------------------------------

fn enabled_by_default() -> bool {
    true
}

/// One backend target inside a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub name: String,
    /// Address as stored. Usually an IPv4 literal, but the store also accepts hostnames.
    pub address: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Fields the store returns that this tool does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Origin {
    /// A freshly created origin for `address`, weighted [`NEW_ORIGIN_WEIGHT`].
    pub fn new(name: impl Into<String>, address: &OriginAddress, enabled: bool) -> Self {
        Self {
            name: name.into(),
            address: address.to_string(),
            enabled,
            weight: Some(NEW_ORIGIN_WEIGHT),
            extra: Map::new(),
        }
    }

    pub fn has_address(&self, address: &OriginAddress) -> bool {
        self.address == address.to_string()
    }
}

/// A pool as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDocument {
    pub id: PoolId,
    pub name: PoolName,
    #[serde(default)]
    pub origins: Vec<Origin>,
    /// Health-check regions. Opaque; written back exactly as read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_regions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `result` of a pool read: one document when fetched by identifier,
/// a collection when the whole account was listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoolListing {
    Collection(Vec<PoolDocument>),
    Single(PoolDocument),
}

impl PoolListing {
    pub fn len(&self) -> usize {
        match self {
            PoolListing::Collection(pools) => pools.len(),
            PoolListing::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pool fields the store reports but rejects on write.
pub const READ_ONLY_POOL_FIELDS: &[&str] = &["created_on", "modified_on", "healthy"];

/// Body of a pool write. The store replaces the pool wholesale, so every
/// writable field of the fetched document is carried along.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolUpdate {
    pub name: PoolName,
    pub origins: Vec<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_regions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PoolUpdate {
    /// The fetched pool minus its id and read-only fields, with new origins.
    pub fn from_fetched(pool: &PoolDocument, origins: Vec<Origin>) -> Self {
        let extra = pool
            .extra
            .iter()
            .filter(|(key, _)| !READ_ONLY_POOL_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self {
            name: pool.name.clone(),
            origins,
            check_regions: pool.check_regions.clone(),
            extra,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(PoolId::from("pool-a").to_string(), "pool-a");
        assert_eq!(PoolName::from("web").to_string(), "web");
    }

    #[test]
    fn default_origin_name_replaces_dots() {
        let address: OriginAddress = "203.0.113.7".parse().expect("address");
        assert_eq!(address.default_origin_name(), "203_0_113_7");
    }

    #[rstest]
    #[case("203.0.113.7\n")]
    #[case("  10.0.0.1 ")]
    fn address_parse_trims_whitespace(#[case] input: &str) {
        assert!(input.parse::<OriginAddress>().is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("2001:db8::1")]
    #[case("<html>rate limited</html>")]
    #[case("256.1.1.1")]
    fn address_parse_rejects_non_ipv4(#[case] input: &str) {
        let err = input.parse::<OriginAddress>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddress { .. }));
    }

    #[rstest]
    #[case("register", Intent::Register)]
    #[case("REGISTER", Intent::Register)]
    #[case("DeRegister", Intent::Deregister)]
    fn intent_parses_case_insensitively(#[case] input: &str, #[case] expected: Intent) {
        assert_eq!(input.parse::<Intent>().expect("intent"), expected);
    }

    #[test]
    fn intent_rejects_unknown_command() {
        let err = "enable".parse::<Intent>().unwrap_err();
        assert!(err.to_string().contains("enable"));
    }

    #[test]
    fn intent_maps_to_enabled_flag() {
        assert!(Intent::Register.enabled());
        assert!(!Intent::Deregister.enabled());
    }

    #[test]
    fn lookup_mode_parse_and_display() {
        assert_eq!("Scan".parse::<LookupMode>().expect("mode"), LookupMode::Scan);
        assert_eq!(LookupMode::Direct.to_string(), "direct");
        assert_eq!(LookupMode::default(), LookupMode::Auto);
    }

    #[test]
    fn origin_keeps_unknown_fields() {
        let raw = json!({
            "name": "edge-1",
            "address": "1.2.3.4",
            "enabled": true,
            "weight": 0.5,
            "header": { "Host": ["example.com"] }
        });
        let origin: Origin = serde_json::from_value(raw.clone()).expect("decode");
        assert_eq!(origin.extra.get("header"), raw.get("header"));
        assert_eq!(serde_json::to_value(&origin).expect("encode"), raw);
    }

    #[test]
    fn origin_without_enabled_defaults_to_enabled() {
        let origin: Origin =
            serde_json::from_value(json!({ "name": "a", "address": "1.2.3.4" })).expect("decode");
        assert!(origin.enabled);
        assert_eq!(origin.weight, None);
    }

    #[test]
    fn listing_decodes_single_and_collection() {
        let single: PoolListing =
            serde_json::from_value(json!({ "id": "a", "name": "x", "origins": [] }))
                .expect("single");
        assert!(matches!(single, PoolListing::Single(_)));

        let many: PoolListing = serde_json::from_value(json!([
            { "id": "a", "name": "x", "origins": [] },
            { "id": "b", "name": "y" }
        ]))
        .expect("collection");
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn update_omits_absent_check_regions() {
        let pool: PoolDocument =
            serde_json::from_value(json!({ "id": "a", "name": "x", "origins": [] }))
                .expect("pool");
        let body = serde_json::to_value(PoolUpdate::from_fetched(&pool, vec![])).expect("body");
        assert_eq!(body, json!({ "name": "x", "origins": [] }));
    }

    #[test]
    fn update_keeps_writable_fields_and_drops_read_only_ones() {
        let pool: PoolDocument = serde_json::from_value(json!({
            "id": "a",
            "name": "x",
            "origins": [],
            "check_regions": ["WEU", "ENAM"],
            "monitor": "m-1",
            "description": "edge pool",
            "minimum_origins": 2,
            "notification_email": "noc@example.com",
            "created_on": "2016-11-01T00:00:00Z",
            "modified_on": "2016-11-02T00:00:00Z",
            "healthy": true
        }))
        .expect("pool");
        let body = serde_json::to_value(PoolUpdate::from_fetched(&pool, vec![])).expect("body");
        assert_eq!(
            body,
            json!({
                "name": "x",
                "origins": [],
                "check_regions": ["WEU", "ENAM"],
                "monitor": "m-1",
                "description": "edge pool",
                "minimum_origins": 2,
                "notification_email": "noc@example.com"
            })
        );
    }
}
