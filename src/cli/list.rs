//! `list` command handler

use crate::cli::commands::{GlobalArgs, KindArg};
use crate::cli::session::{kind_filter, Session};
use crate::error::Result;
use crate::github::{
    DiscussionHandler, IdentifierResolver, IssueHandler, ItemKind, LabelHandler,
    PullRequestHandler,
};

/// Handle `list`
///
/// Prints node IDs so they can be copied into `preserve_by_id`.
pub async fn handle_list(global: &GlobalArgs, only: Vec<KindArg>) -> Result<()> {
    let session = Session::from_args(global)?;
    let kinds = kind_filter(only);
    let client = session.client()?;
    let (owner, repo) = client.target()?;
    let ctx = session.context();

    println!("Content of {}/{}:", owner, repo);

    if kinds.includes(ItemKind::Label) {
        let labels = LabelHandler::new(&client).list(&ctx).await?;
        println!("\nLabels ({}):", labels.len());
        for label in labels {
            println!("  {:<24} {}", label.node_id, label.name);
        }
    }

    if kinds.includes(ItemKind::Issue) {
        let issues = IssueHandler::new(&client).list(&ctx).await?;
        println!("\nIssues ({}):", issues.len());
        for issue in issues {
            println!("  {:<24} #{} {}", issue.node_id, issue.number, issue.title);
        }
    }

    if kinds.includes(ItemKind::Discussion) {
        let categories = IdentifierResolver::new(&client)
            .list_categories(&ctx, &owner, &repo)
            .await?;
        println!("\nDiscussion categories ({}):", categories.len());
        for category in categories {
            println!("  {:<24} {}", category.id, category.name);
        }

        let discussions = DiscussionHandler::new(&client).list(&ctx).await?;
        println!("\nDiscussions ({}):", discussions.len());
        for discussion in discussions {
            println!(
                "  {:<24} #{} {} [{}]",
                discussion.node_id, discussion.number, discussion.title, discussion.category
            );
        }
    }

    if kinds.includes(ItemKind::PullRequest) {
        let prs = PullRequestHandler::new(&client).list(&ctx).await?;
        println!("\nOpen pull requests ({}):", prs.len());
        for pr in prs {
            let draft = if pr.draft { " [draft]" } else { "" };
            println!(
                "  {:<24} #{} {} ({} → {}){}",
                pr.node_id, pr.number, pr.title, pr.head, pr.base, draft
            );
        }
    }

    Ok(())
}
