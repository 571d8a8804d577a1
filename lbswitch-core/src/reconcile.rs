//! Origin reconciliation: match-or-insert on the pool's origin list.

use crate::types::{Origin, OriginAddress};

/// What [`reconcile`] did to the origin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginChange {
    /// No origin carried the address; one was appended.
    Inserted,
    /// The first origin carrying the address had its `enabled` flag set.
    Updated { previously_enabled: bool },
}

/// New origin list plus a description of the change.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub origins: Vec<Origin>,
    pub change: OriginChange,
}

/// Compute the origin list to persist so that the origin at `address`
/// carries `enabled`.
///
/// - If an origin with that address exists, the first one gets `enabled` set;
///   its name, weight and any extra fields are kept.
/// - Otherwise a new origin is appended, named `name_override` (or the
///   address with `.` → `_`) and weighted `1.0`.
///
/// Every other origin is kept, in order. `current` is never mutated.
pub fn reconcile(
    current: &[Origin],
    address: &OriginAddress,
    enabled: bool,
    name_override: Option<&str>,
) -> Reconciled {
    let mut origins = current.to_vec();

    if let Some(existing) = origins.iter_mut().find(|origin| origin.has_address(address)) {
        let previously_enabled = existing.enabled;
        existing.enabled = enabled;
        return Reconciled {
            origins,
            change: OriginChange::Updated { previously_enabled },
        };
    }

    let name = name_override
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| address.default_origin_name());
    origins.push(Origin::new(name, address, enabled));

    Reconciled {
        origins,
        change: OriginChange::Inserted,
    }
}
