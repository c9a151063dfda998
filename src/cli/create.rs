//! `create` command handler

use crate::cli::commands::{GlobalArgs, KindArg};
use crate::cli::session::{kind_filter, Session};
use crate::core::SeedContent;
use crate::error::Result;
use crate::github::{CreatedItemInfo, ItemKind};
use crate::seed::ContentOrchestrator;

/// Handle `create`
///
/// Content is loaded, narrowed to `--only` and validated before the token is
/// looked up, so a bad file never reaches the network.
pub async fn handle_create(global: &GlobalArgs, only: Vec<KindArg>) -> Result<()> {
    let session = Session::from_args(global)?;
    let kinds = kind_filter(only);
    let content =
        SeedContent::load(&session.content_dir)?.retain_kinds(|kind| kinds.includes(kind));
    content.validate()?;

    if content.is_empty() {
        println!(
            "No content found in {}. Nothing to create.",
            session.content_dir.display()
        );
        return Ok(());
    }

    let client = session.client()?;
    let (owner, repo) = client.target()?;
    println!("Creating {} items in {}/{}...\n", content.len(), owner, repo);

    let ctx = session.context();
    let outcome = ContentOrchestrator::new(&client)
        .create_all(&ctx, content, &kinds)
        .await;

    for info in &outcome.created {
        println!("{}", format_created(info));
    }
    println!("\nCreated {} items.", outcome.created.len());

    outcome.result
}

fn format_created(info: &CreatedItemInfo) -> String {
    let number = match info.kind {
        ItemKind::Label => String::new(),
        _ => format!("#{} ", info.number),
    };
    format!("  {:<13} {}{}\n    {}", info.kind, number, info.title, info.url)
}
