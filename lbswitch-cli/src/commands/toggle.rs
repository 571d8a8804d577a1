//! `lbswitch register|deregister` — toggle this machine's origin in a pool.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use lbswitch_client::{
    pipeline::{self, RunConfig, RunOutcome},
    resolver::DEFAULT_RESOLVER_URL,
    store::DEFAULT_API_BASE,
    ClientError, CloudflareStore, Credentials, EchoResolver, Progress,
};
use lbswitch_core::{Intent, LookupMode, OriginChange, PoolId, PoolName, PoolSelector};

use crate::progress::ConsoleProgress;

/// Pool, credentials and origin options shared by both commands.
#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Load balancer pool identifier.
    #[arg(long, env = "LBSWITCH_POOL_ID")]
    pub identifier: Option<String>,

    /// Load balancer pool name, matched across every pool on the account.
    #[arg(long, env = "LBSWITCH_POOL_NAME")]
    pub name: Option<String>,

    /// API key.
    #[arg(long = "api-key", env = "CF_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Account email address.
    #[arg(long, env = "CF_API_EMAIL")]
    pub email: Option<String>,

    /// Name for the origin when it has to be created (default: address with `.` → `_`).
    #[arg(long = "origin-name", env = "LBSWITCH_ORIGIN_NAME")]
    pub origin_name: Option<String>,

    /// Origin weight, any finite value >= 0. Accepted but not applied: new
    /// origins get 1.0 and existing weights are kept.
    #[arg(long = "origin-weight", value_name = "WEIGHT", value_parser = parse_weight)]
    pub origin_weight: Option<f64>,

    /// How the pool is read: auto | direct | scan.
    #[arg(long, value_name = "MODE", env = "LBSWITCH_LOOKUP", default_value_t = LookupMode::Auto)]
    pub lookup: LookupMode,

    /// Show the origin list that would be written without writing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Load balancer API base URL.
    #[arg(long, env = "LBSWITCH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Address-echo service answering with this machine's public IPv4 address.
    #[arg(long, env = "LBSWITCH_RESOLVER_URL", default_value = DEFAULT_RESOLVER_URL)]
    pub resolver_url: String,

    /// Timeout for each network call, in seconds.
    #[arg(long, env = "LBSWITCH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl ToggleArgs {
    pub fn run(self, intent: Intent) -> Result<()> {
        let mut progress = ConsoleProgress::new();

        progress.step("Setting up environment");
        progress.ok(&format!("Set Command: {intent}"));
        let (config, credentials) = self.setup(intent, &mut progress)?;

        let timeout = Duration::from_secs(self.timeout_secs);
        let resolver = EchoResolver::new(self.resolver_url, timeout);
        let store = CloudflareStore::new(self.api_base, credentials, timeout);

        let outcome = pipeline::run(&config, &resolver, &store, &mut progress)
            .with_context(|| format!("failed to {intent} this machine"))?;

        if !outcome.written {
            print_plan(&outcome);
        }
        Ok(())
    }

    /// Validate settings before any network call, reporting each one.
    fn setup(
        &self,
        intent: Intent,
        progress: &mut dyn Progress,
    ) -> Result<(RunConfig, Credentials)> {
        let api_key = present(&self.api_key);
        let email = present(&self.email);
        let identifier = present(&self.identifier);
        let name = present(&self.name);

        match api_key {
            Some(key) => progress.ok(&format!("Set API key: {}", mask(key))),
            None => progress.fail("No API key specified"),
        }
        match email {
            Some(email) => progress.ok(&format!("Set Email: {email}")),
            None => progress.fail("No email specified"),
        }
        match identifier {
            Some(id) => progress.ok(&format!("Set Identifier: {id}")),
            None => progress.note("No identifier specified"),
        }
        match name {
            Some(name) => progress.ok(&format!("Set Name: {name}")),
            None => progress.note("No name specified"),
        }

        let selector = PoolSelector::new(identifier.map(PoolId::from), name.map(PoolName::from));
        if selector.is_err() {
            progress.fail("Error: name or identifier required");
        }
        if self.lookup != LookupMode::Auto {
            progress.ok(&format!("Set lookup mode: {}", self.lookup));
        }
        if self.dry_run {
            progress.note("Dry run: the pool will not be written");
        }

        let (Some(api_key), Some(email), Ok(selector)) = (api_key, email, selector) else {
            let mut missing = Vec::new();
            if api_key.is_none() {
                missing.push("--api-key");
            }
            if email.is_none() {
                missing.push("--email");
            }
            if identifier.is_none() && name.is_none() {
                missing.push("--identifier or --name");
            }
            return Err(ClientError::Precondition(format!("missing {}", missing.join(", "))).into());
        };
        pipeline::check_lookup(&selector, self.lookup)
            .inspect_err(|_| progress.fail("Error: --lookup direct needs an identifier"))?;

        let config = RunConfig {
            intent,
            selector,
            lookup: self.lookup,
            origin_name: self.origin_name.clone(),
            origin_weight: self.origin_weight,
            dry_run: self.dry_run,
        };
        let credentials = Credentials {
            email: email.to_owned(),
            api_key: api_key.to_owned(),
        };
        Ok((config, credentials))
    }
}

/// Treat unset and blank arguments alike.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Keep only the last four characters of a secret visible.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

fn parse_weight(s: &str) -> std::result::Result<f64, String> {
    let weight: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be a finite number >= 0, got {s}"));
    }
    Ok(weight)
}

// ---------------------------------------------------------------------------
// Dry-run output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct OriginRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "address")]
    address: String,
    #[tabled(rename = "enabled")]
    enabled: String,
    #[tabled(rename = "weight")]
    weight: String,
    #[tabled(rename = "change")]
    change: String,
}

fn print_plan(outcome: &RunOutcome) {
    let changed = outcome
        .origins
        .iter()
        .position(|origin| origin.has_address(&outcome.address));

    let rows: Vec<OriginRow> = outcome
        .origins
        .iter()
        .enumerate()
        .map(|(index, origin)| OriginRow {
            name: origin.name.clone(),
            address: origin.address.clone(),
            enabled: origin.enabled.to_string(),
            weight: origin
                .weight
                .map(|w| w.to_string())
                .unwrap_or_else(|| "-".to_string()),
            change: if Some(index) == changed {
                change_label(outcome.change, origin.enabled)
            } else {
                String::new()
            },
        })
        .collect();

    println!(
        "\nPlanned origins for pool '{}' ({}):",
        outcome.pool_name, outcome.pool_id
    );
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn change_label(change: OriginChange, enabled: bool) -> String {
    match change {
        OriginChange::Inserted => "added".to_string(),
        OriginChange::Updated { previously_enabled } if previously_enabled == enabled => {
            "unchanged".to_string()
        }
        OriginChange::Updated { previously_enabled } => {
            format!("enabled {previously_enabled} → {enabled}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask("abcdef123456"), "********3456");
        assert_eq!(mask("abc"), "***");
    }

    #[test]
    fn parse_weight_accepts_non_negative_values() {
        assert_eq!(parse_weight("0"), Ok(0.0));
        assert_eq!(parse_weight("0.5"), Ok(0.5));
        assert_eq!(parse_weight("2"), Ok(2.0));
    }

    #[test]
    fn parse_weight_rejects_negative_and_garbage() {
        assert!(parse_weight("-0.1").is_err());
        assert!(parse_weight("inf").is_err());
        assert!(parse_weight("NaN").is_err());
        assert!(parse_weight("heavy").is_err());
    }

    #[test]
    fn change_label_describes_the_edit() {
        assert_eq!(change_label(OriginChange::Inserted, true), "added");
        assert_eq!(
            change_label(OriginChange::Updated { previously_enabled: true }, true),
            "unchanged"
        );
        assert_eq!(
            change_label(OriginChange::Updated { previously_enabled: true }, false),
            "enabled true → false"
        );
    }

    #[test]
    fn present_ignores_blank_values() {
        assert_eq!(present(&Some("  ".to_string())), None);
        assert_eq!(present(&Some(" pool ".to_string())), Some("pool"));
        assert_eq!(present(&None), None);
    }
}
