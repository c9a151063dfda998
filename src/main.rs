//! gh-demo-seed - Populate and reset GitHub demo repositories
//!
//! Creates issues, discussions, pull requests and labels from JSON files,
//! lists what exists, and cleans it up again while honouring preserve rules.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gh_demo_seed::cli::commands::{Cli, Commands};
use gh_demo_seed::cli::{cleanup, create, list};
use gh_demo_seed::error::{Result, SeedError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        handle_error(&e);
        std::process::exit(1);
    }
}

/// Print an error, with a hint for organization access restrictions
fn handle_error(e: &SeedError) {
    eprintln!("Error: {}", e);

    if let SeedError::Layered(layered) = e {
        if let Some(org) = layered.context_map().get("organization") {
            eprintln!();
            eprintln!(
                "The '{}' organization restricts OAuth app access. Set GH_TOKEN to a",
                org
            );
            eprintln!("personal access token that the organization allows.");
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create { only } => create::handle_create(&cli.global, only).await,
        Commands::Cleanup {
            dry_run,
            preserve,
            only,
        } => cleanup::handle_cleanup(&cli.global, dry_run, preserve, only).await,
        Commands::List { only } => list::handle_list(&cli.global, only).await,
    }
}
