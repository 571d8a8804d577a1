//! Pool lookup.
//!
//! A store read yields either one pool (fetched by identifier) or every pool
//! on the account. [`locate`] narrows both shapes down to a single document.

use std::fmt;

use crate::error::CoreError;
use crate::types::{PoolDocument, PoolId, PoolListing, PoolName};

/// Which pool the caller asked for. At least one of the two keys is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSelector {
    identifier: Option<PoolId>,
    name: Option<PoolName>,
}

impl PoolSelector {
    /// Build a selector; blank strings count as absent.
    ///
    /// Returns [`CoreError::MissingSelector`] when neither key is given.
    pub fn new(identifier: Option<PoolId>, name: Option<PoolName>) -> Result<Self, CoreError> {
        let identifier = identifier.filter(|id| !id.0.trim().is_empty());
        let name = name.filter(|name| !name.0.trim().is_empty());
        if identifier.is_none() && name.is_none() {
            return Err(CoreError::MissingSelector);
        }
        Ok(Self { identifier, name })
    }

    pub fn by_id(identifier: impl Into<PoolId>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<PoolName>) -> Self {
        Self {
            identifier: None,
            name: Some(name.into()),
        }
    }

    pub fn identifier(&self) -> Option<&PoolId> {
        self.identifier.as_ref()
    }

    pub fn name(&self) -> Option<&PoolName> {
        self.name.as_ref()
    }

    /// `id == identifier` OR `name == name`.
    pub fn matches(&self, pool: &PoolDocument) -> bool {
        self.identifier.as_ref() == Some(&pool.id) || self.name.as_ref() == Some(&pool.name)
    }
}

impl fmt::Display for PoolSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.identifier, &self.name) {
            (Some(id), Some(name)) => write!(f, "identifier '{id}' or name '{name}'"),
            (Some(id), None) => write!(f, "identifier '{id}'"),
            (None, Some(name)) => write!(f, "name '{name}'"),
            (None, None) => f.write_str("no selector"),
        }
    }
}

/// Select exactly one pool from a store listing.
///
/// A single document is returned as-is: the store already narrowed it.
/// A collection yields its first element matching `selector`, in store order.
pub fn locate(listing: PoolListing, selector: &PoolSelector) -> Result<PoolDocument, CoreError> {
    match listing {
        PoolListing::Single(pool) => Ok(pool),
        PoolListing::Collection(pools) => pools
            .into_iter()
            .find(|pool| selector.matches(pool))
            .ok_or_else(|| CoreError::PoolNotFound {
                selector: selector.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn pool(id: &str, name: &str) -> PoolDocument {
        PoolDocument {
            id: PoolId::from(id),
            name: PoolName::from(name),
            origins: vec![],
            check_regions: None,
            extra: Default::default(),
        }
    }

    fn three_pools() -> PoolListing {
        PoolListing::Collection(vec![pool("A", "x"), pool("B", "y"), pool("C", "z")])
    }

    #[test]
    fn selector_requires_identifier_or_name() {
        assert_eq!(PoolSelector::new(None, None), Err(CoreError::MissingSelector));
    }

    #[test]
    fn selector_treats_blank_as_absent() {
        let err = PoolSelector::new(Some(PoolId::from("")), Some(PoolName::from("  ")));
        assert_eq!(err, Err(CoreError::MissingSelector));
    }

    #[test]
    fn locate_by_identifier_in_collection() {
        let found = locate(three_pools(), &PoolSelector::by_id("B")).expect("locate");
        assert_eq!(found.id, PoolId::from("B"));
    }

    #[test]
    fn locate_by_name_in_collection() {
        let found = locate(three_pools(), &PoolSelector::by_name("z")).expect("locate");
        assert_eq!(found.name, PoolName::from("z"));
        assert_eq!(found.id, PoolId::from("C"));
    }

    #[rstest]
    #[case(PoolSelector::by_id("Q"))]
    #[case(PoolSelector::by_name("q"))]
    #[case(PoolSelector::by_id("x"))]
    fn locate_unknown_pool_fails(#[case] selector: PoolSelector) {
        let err = locate(three_pools(), &selector).unwrap_err();
        assert!(matches!(err, CoreError::PoolNotFound { .. }), "got: {err}");
    }

    #[test]
    fn locate_either_key_matches_first_in_store_order() {
        let selector =
            PoolSelector::new(Some(PoolId::from("C")), Some(PoolName::from("y"))).expect("sel");
        let found = locate(three_pools(), &selector).expect("locate");
        assert_eq!(found.id, PoolId::from("B"));
    }

    #[test]
    fn locate_single_document_is_returned_as_is() {
        let listing = PoolListing::Single(pool("A", "x"));
        let found = locate(listing, &PoolSelector::by_name("unrelated")).expect("locate");
        assert_eq!(found.id, PoolId::from("A"));
    }

    #[test]
    fn not_found_message_names_selector() {
        let err = locate(PoolListing::Collection(vec![]), &PoolSelector::by_name("web"))
            .unwrap_err();
        assert_eq!(err.to_string(), "no pool matched name 'web'");
    }
}
