//! Resolve → read → locate → reconcile → write, strictly in sequence.
//!
//! Each stage blocks on the previous one and any failure ends the run.
//! Nothing is rolled back: the only mutation is the final write, and the
//! store applies it whole or not at all.

use lbswitch_core::{
    locate, reconcile, Intent, LookupMode, Origin, OriginAddress, OriginChange, PoolId, PoolName,
    PoolSelector, PoolUpdate,
};

use crate::error::ClientError;
use crate::resolver::AddressResolver;
use crate::store::{FetchedPools, PoolStore};

/// Everything one invocation needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub intent: Intent,
    pub selector: PoolSelector,
    pub lookup: LookupMode,
    /// Name for a newly created origin. Never renames an existing one.
    pub origin_name: Option<String>,
    /// Accepted for compatibility; origins are created with weight 1.0 and
    /// existing weights are left alone.
    pub origin_weight: Option<f64>,
    /// Stop after reconciling; the store is not written.
    pub dry_run: bool,
}

/// Receives human-oriented progress as the pipeline advances.
pub trait Progress {
    /// A new numbered stage begins.
    fn step(&mut self, title: &str);
    fn ok(&mut self, message: &str);
    /// Something worth noting that is not a failure.
    fn note(&mut self, message: &str);
    /// The change about to be made.
    fn action(&mut self, message: &str);
    /// The current stage failed; the error follows.
    fn fail(&mut self, message: &str);
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub pool_id: PoolId,
    pub pool_name: PoolName,
    pub address: OriginAddress,
    pub change: OriginChange,
    /// The origin list that was (or, on a dry run, would have been) written.
    pub origins: Vec<Origin>,
    pub written: bool,
}

/// Run one register/deregister cycle.
pub fn run(
    config: &RunConfig,
    resolver: &dyn AddressResolver,
    store: &dyn PoolStore,
    progress: &mut dyn Progress,
) -> Result<RunOutcome, ClientError> {
    check_lookup(&config.selector, config.lookup)?;
    if let Some(weight) = config.origin_weight {
        tracing::warn!(weight, "origin weight override is accepted but not applied");
    }

    progress.step("Getting IP address");
    let address = resolver
        .resolve()
        .inspect_err(|_| progress.fail("Error getting IP address"))?;
    progress.ok(&format!("Got IP address: {address}"));
    tracing::info!(%address, "resolved public address");

    progress.step("Getting pool details");
    let FetchedPools {
        status,
        body,
        listing,
    } = read_listing(store, &config.selector, config.lookup)
        .inspect_err(|_| progress.fail("Error getting pool details"))?;
    progress.ok("Got pool details");

    let pool = match locate(listing, &config.selector) {
        Ok(pool) => pool,
        Err(source) => {
            progress.fail("Couldn't find correct pool");
            return Err(ClientError::NotFound {
                source,
                status,
                body,
            });
        }
    };
    progress.ok(&format!("Found correct pool: {} ({})", pool.name, pool.id));

    let matching = pool
        .origins
        .iter()
        .filter(|origin| origin.has_address(&address))
        .count();
    if matching > 0 {
        progress.ok("Found correct origin within pool");
    } else {
        progress.note("Could not find correct origin within pool");
    }
    if matching > 1 {
        tracing::warn!(
            pool_id = %pool.id,
            %address,
            matching,
            "pool holds several origins with this address; only the first is updated"
        );
    }

    progress.step(&format!("{} instance in pool", config.intent.gerund()));
    let reconciled = reconcile(
        &pool.origins,
        &address,
        config.intent.enabled(),
        config.origin_name.as_deref(),
    );
    match reconciled.change {
        OriginChange::Inserted => progress.action("Adding instance to pool"),
        OriginChange::Updated { .. } => progress.action("Updating pool instances"),
    }

    let mut outcome = RunOutcome {
        pool_id: pool.id.clone(),
        pool_name: pool.name.clone(),
        address,
        change: reconciled.change,
        origins: reconciled.origins,
        written: false,
    };

    if config.dry_run {
        progress.note("Dry run: pool left unchanged");
        return Ok(outcome);
    }

    let update = PoolUpdate::from_fetched(&pool, outcome.origins.clone());
    store
        .write_pool(&pool.id, &update)
        .inspect_err(|_| progress.fail("Error updating pool"))?;
    progress.ok("Successfully updated pool");
    tracing::info!(
        pool_id = %pool.id,
        %address,
        intent = %config.intent,
        "pool updated"
    );

    outcome.written = true;
    Ok(outcome)
}

/// Reject lookup settings that could never reach a pool, before any network call.
pub fn check_lookup(selector: &PoolSelector, lookup: LookupMode) -> Result<(), ClientError> {
    if lookup == LookupMode::Direct && selector.identifier().is_none() {
        return Err(direct_without_identifier());
    }
    Ok(())
}

fn direct_without_identifier() -> ClientError {
    ClientError::Precondition("direct lookup needs a pool identifier".to_owned())
}

/// Issue the store read matching the lookup mode.
fn read_listing(
    store: &dyn PoolStore,
    selector: &PoolSelector,
    lookup: LookupMode,
) -> Result<FetchedPools, ClientError> {
    match (lookup, selector.identifier()) {
        (LookupMode::Direct | LookupMode::Auto, Some(identifier)) => store.fetch_pool(identifier),
        (LookupMode::Direct, None) => Err(direct_without_identifier()),
        (LookupMode::Scan, _) | (LookupMode::Auto, None) => store.fetch_pools(),
    }
}
