//! Create and cleanup runs
//!
//! Items are processed one at a time in input order. Per-item failures are
//! collected and reduced at the end, so a run reports every failed item while
//! keeping everything that did succeed. Cancellation stops the remaining
//! items; nothing already created or deleted is rolled back.

use crate::core::aggregate::ErrorAggregator;
use crate::core::content::SeedContent;
use crate::core::preserve::{PreserveCandidate, PreserveConfig};
use crate::core::OperationContext;
use crate::error::Result;
use crate::github::{
    CreatedItemInfo, DiscussionHandler, GitHubClient, IssueHandler, ItemKind, LabelHandler,
    PullRequestHandler,
};

/// Result of a create run
#[derive(Debug)]
pub struct CreateOutcome {
    /// Receipts for every item that was created, in creation order
    pub created: Vec<CreatedItemInfo>,
    /// Aggregated failures
    pub result: Result<()>,
}

/// An item touched by cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEntry {
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
}

impl CleanupEntry {
    fn of<C: PreserveCandidate>(kind: ItemKind, item: &C) -> Self {
        Self {
            kind,
            id: item.preserve_id().to_string(),
            title: item.preserve_title().to_string(),
        }
    }
}

/// Result of a cleanup run
#[derive(Debug)]
pub struct CleanupOutcome {
    /// Items deleted (or, in a dry run, that would be deleted)
    pub removed: Vec<CleanupEntry>,
    /// Items kept by a preserve rule
    pub preserved: Vec<CleanupEntry>,
    pub dry_run: bool,
    pub result: Result<()>,
}

/// Which kinds a run touches; empty means all
#[derive(Debug, Clone, Default)]
pub struct KindFilter(Vec<ItemKind>);

impl KindFilter {
    pub fn new(kinds: Vec<ItemKind>) -> Self {
        Self(kinds)
    }

    pub fn includes(&self, kind: ItemKind) -> bool {
        self.0.is_empty() || self.0.contains(&kind)
    }
}

/// Record a cancellation/deadline error and report whether to stop
fn interrupted(ctx: &OperationContext, operation: &str, errors: &mut ErrorAggregator) -> bool {
    match ctx.check(operation) {
        Ok(()) => false,
        Err(e) => {
            errors.add(e);
            true
        }
    }
}

/// Sequences creators and deleters for a whole run
pub struct ContentOrchestrator<'a> {
    client: &'a GitHubClient,
}

impl<'a> ContentOrchestrator<'a> {
    /// Create a new orchestrator
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Create labels, issues, discussions and pull requests, in that order
    pub async fn create_all(
        &self,
        ctx: &OperationContext,
        content: SeedContent,
        kinds: &KindFilter,
    ) -> CreateOutcome {
        let mut created = Vec::new();
        let mut errors = ErrorAggregator::new();

        'run: {
            if kinds.includes(ItemKind::Label) {
                let handler = LabelHandler::new(self.client);
                for label in content.labels {
                    if interrupted(ctx, "create labels", &mut errors) {
                        break 'run;
                    }
                    created.extend(errors.record(handler.create(ctx, label).await));
                }
            }

            if kinds.includes(ItemKind::Issue) {
                let handler = IssueHandler::new(self.client);
                for issue in content.issues {
                    if interrupted(ctx, "create issues", &mut errors) {
                        break 'run;
                    }
                    created.extend(errors.record(handler.create(ctx, issue).await));
                }
            }

            if kinds.includes(ItemKind::Discussion) {
                let handler = DiscussionHandler::new(self.client);
                for discussion in content.discussions {
                    if interrupted(ctx, "create discussions", &mut errors) {
                        break 'run;
                    }
                    created.extend(errors.record(handler.create(ctx, discussion).await));
                }
            }

            if kinds.includes(ItemKind::PullRequest) {
                let handler = PullRequestHandler::new(self.client);
                for pr in content.pull_requests {
                    if interrupted(ctx, "create pull requests", &mut errors) {
                        break 'run;
                    }
                    created.extend(errors.record(handler.create(ctx, pr).await));
                }
            }
        }

        tracing::info!(created = created.len(), failed = errors.len(), "create run finished");
        CreateOutcome {
            created,
            result: errors.into_result(),
        }
    }

    /// Delete everything not covered by `preserve`
    ///
    /// Order: pull requests, issues, discussions, labels. With `dry_run` set,
    /// items are listed and classified but nothing is deleted.
    pub async fn cleanup_all(
        &self,
        ctx: &OperationContext,
        preserve: &PreserveConfig,
        kinds: &KindFilter,
        dry_run: bool,
    ) -> CleanupOutcome {
        let mut run = CleanupRun {
            ctx,
            dry_run,
            removed: Vec::new(),
            preserved: Vec::new(),
            errors: ErrorAggregator::new(),
        };

        'run: {
            if kinds.includes(ItemKind::PullRequest) {
                let handler = PullRequestHandler::new(self.client);
                if let Some(prs) = run.errors.record(handler.list(ctx).await) {
                    for pr in prs {
                        match run.classify(ItemKind::PullRequest, &pr, preserve) {
                            Verdict::Stop => break 'run,
                            Verdict::Keep => continue,
                            Verdict::Remove => {}
                        }
                        let outcome = run.delete(handler.delete(ctx, &pr.node_id)).await;
                        run.finish(ItemKind::PullRequest, &pr, outcome);
                    }
                }
            }

            if kinds.includes(ItemKind::Issue) {
                let handler = IssueHandler::new(self.client);
                if let Some(issues) = run.errors.record(handler.list(ctx).await) {
                    for issue in issues {
                        match run.classify(ItemKind::Issue, &issue, preserve) {
                            Verdict::Stop => break 'run,
                            Verdict::Keep => continue,
                            Verdict::Remove => {}
                        }
                        let outcome = run.delete(handler.delete(ctx, &issue.node_id)).await;
                        run.finish(ItemKind::Issue, &issue, outcome);
                    }
                }
            }

            if kinds.includes(ItemKind::Discussion) {
                let handler = DiscussionHandler::new(self.client);
                if let Some(discussions) = run.errors.record(handler.list(ctx).await) {
                    for discussion in discussions {
                        match run.classify(ItemKind::Discussion, &discussion, preserve) {
                            Verdict::Stop => break 'run,
                            Verdict::Keep => continue,
                            Verdict::Remove => {}
                        }
                        let outcome = run.delete(handler.delete(ctx, &discussion.node_id)).await;
                        run.finish(ItemKind::Discussion, &discussion, outcome);
                    }
                }
            }

            // Listed labels carry node IDs, so skip the name lookup
            if kinds.includes(ItemKind::Label) {
                let handler = LabelHandler::new(self.client);
                if let Some(labels) = run.errors.record(handler.list(ctx).await) {
                    for label in labels {
                        match run.classify(ItemKind::Label, &label, preserve) {
                            Verdict::Stop => break 'run,
                            Verdict::Keep => continue,
                            Verdict::Remove => {}
                        }
                        let outcome = run.delete(handler.delete_by_id(ctx, &label.node_id)).await;
                        run.finish(ItemKind::Label, &label, outcome);
                    }
                }
            }
        }

        tracing::info!(
            removed = run.removed.len(),
            preserved = run.preserved.len(),
            failed = run.errors.len(),
            dry_run,
            "cleanup run finished"
        );
        CleanupOutcome {
            removed: run.removed,
            preserved: run.preserved,
            dry_run,
            result: run.errors.into_result(),
        }
    }
}

/// Mutable state of one cleanup run
struct CleanupRun<'c> {
    ctx: &'c OperationContext,
    dry_run: bool,
    removed: Vec<CleanupEntry>,
    preserved: Vec<CleanupEntry>,
    errors: ErrorAggregator,
}

/// What cleanup does with one listed item
enum Verdict {
    Keep,
    Remove,
    /// The context is done; stop the whole run
    Stop,
}

impl<'c> CleanupRun<'c> {
    fn classify<C: PreserveCandidate>(
        &mut self,
        kind: ItemKind,
        item: &C,
        preserve: &PreserveConfig,
    ) -> Verdict {
        if interrupted(self.ctx, "cleanup", &mut self.errors) {
            return Verdict::Stop;
        }

        let rules = match kind {
            ItemKind::Issue => &preserve.issues,
            ItemKind::Discussion => &preserve.discussions,
            ItemKind::PullRequest => &preserve.pull_requests,
            ItemKind::Label => &preserve.labels,
        };

        if rules.should_preserve(item) {
            tracing::debug!(%kind, title = item.preserve_title(), "preserved");
            self.preserved.push(CleanupEntry::of(kind, item));
            return Verdict::Keep;
        }
        Verdict::Remove
    }

    /// Await a delete unless this is a dry run
    async fn delete<F>(&self, fut: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        if self.dry_run {
            return Ok(());
        }
        fut.await
    }

    fn finish<C: PreserveCandidate>(&mut self, kind: ItemKind, item: &C, outcome: Result<()>) {
        if self.errors.record(outcome).is_some() {
            self.removed.push(CleanupEntry::of(kind, item));
        }
    }
}
