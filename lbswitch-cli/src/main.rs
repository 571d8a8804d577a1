//! lbswitch — add or remove this machine from a load balancer pool.
//!
//! # Usage
//!
//! ```text
//! lbswitch register   --identifier <ID> --api-key <KEY> --email <EMAIL>
//! lbswitch deregister --name <POOL> --api-key <KEY> --email <EMAIL>
//! lbswitch register   --identifier <ID> ... [--origin-name <NAME>] [--dry-run]
//! ```

mod commands;
mod progress;

use anyhow::Result;
use clap::Parser;

use commands::toggle::ToggleArgs;
use lbswitch_core::Intent;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "lbswitch",
    version,
    about = "Register or deregister this machine as an origin in a load balancer pool",
    long_about = None,
)]
struct Cli {
    /// `register` or `deregister` (case-insensitive).
    #[arg(value_name = "COMMAND")]
    command: Intent,

    #[command(flatten)]
    toggle: ToggleArgs,

    /// Disable colors from output.
    #[arg(long)]
    no_color: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(!cli.no_color);
    cli.toggle.run(cli.command)
}

fn init_tracing(ansi: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .try_init();
}
