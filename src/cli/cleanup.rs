//! `cleanup` command handler

use std::path::PathBuf;

use crate::cli::commands::{GlobalArgs, KindArg};
use crate::cli::session::{kind_filter, Session};
use crate::core::content::PRESERVE_FILE;
use crate::core::PreserveConfig;
use crate::error::Result;
use crate::seed::{CleanupEntry, ContentOrchestrator};

/// Handle `cleanup`
pub async fn handle_cleanup(
    global: &GlobalArgs,
    dry_run: bool,
    preserve: Option<PathBuf>,
    only: Vec<KindArg>,
) -> Result<()> {
    let session = Session::from_args(global)?;
    let preserve_path = preserve.unwrap_or_else(|| session.content_dir.join(PRESERVE_FILE));
    let rules = PreserveConfig::load(&preserve_path)?;
    if rules.is_empty() {
        println!(
            "No preserve rules in {}; every listed item is removable.",
            preserve_path.display()
        );
    }

    let client = session.client()?;
    let (owner, repo) = client.target()?;

    let ctx = session.context();
    let outcome = ContentOrchestrator::new(&client)
        .cleanup_all(&ctx, &rules, &kind_filter(only), dry_run)
        .await;

    let verb = if outcome.dry_run { "Would remove" } else { "Removed" };
    println!("{} {} items from {}/{}:", verb, outcome.removed.len(), owner, repo);
    print_entries(&outcome.removed);

    println!("\nPreserved {} items:", outcome.preserved.len());
    print_entries(&outcome.preserved);

    outcome.result
}

fn print_entries(entries: &[CleanupEntry]) {
    for entry in entries {
        println!("  {:<13} {:<24} {}", entry.kind, entry.id, entry.title);
    }
}
