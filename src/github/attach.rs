//! Best-effort label and assignee attachment
//!
//! Runs after an item has been created. Names that cannot be resolved are
//! skipped, and a failed attach call is recorded in the report. Nothing here
//! returns an error: the item already exists.

use serde_json::json;

use crate::core::OperationContext;
use crate::error::{Result, SeedError};
use crate::github::client::GitHubClient;
use crate::github::resolver::IdentifierResolver;
use crate::github::transport::RestMethod;

const ADD_LABELS_MUTATION: &str = r#"
mutation AddLabels($labelableId: ID!, $labelIds: [ID!]!) {
  addLabelsToLabelable(input: { labelableId: $labelableId, labelIds: $labelIds }) {
    clientMutationId
  }
}
"#;

const ADD_ASSIGNEES_MUTATION: &str = r#"
mutation AddAssignees($assignableId: ID!, $assigneeIds: [ID!]!) {
  addAssigneesToAssignable(input: { assignableId: $assignableId, assigneeIds: $assigneeIds }) {
    clientMutationId
  }
}
"#;

/// Outcome of one attachment step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentReport {
    /// Names that were attached
    pub attached: Vec<String>,
    /// Names whose ID could not be resolved
    pub skipped: Vec<String>,
    /// Message of a failed attach call
    pub failure: Option<String>,
}

impl AttachmentReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failure.is_none()
    }

    /// Keep the first failure
    fn fail(&mut self, err: &SeedError) {
        if self.failure.is_none() {
            self.failure = Some(err.to_string());
        }
    }

    fn merge(&mut self, other: AttachmentReport) {
        self.attached.extend(other.attached);
        self.skipped.extend(other.skipped);
        if self.failure.is_none() {
            self.failure = other.failure;
        }
    }

    /// Log skipped names and failures for the item at `target`
    pub fn log(&self, what: &str, target: &str) {
        if !self.attached.is_empty() {
            tracing::debug!(target_item = target, names = ?self.attached, "attached {}", what);
        }
        if !self.skipped.is_empty() {
            tracing::warn!(target_item = target, names = ?self.skipped, "skipped unknown {}", what);
        }
        if let Some(failure) = &self.failure {
            tracing::warn!(target_item = target, error = %failure, "could not attach {}", what);
        }
    }
}

/// Names resolved to node IDs, plus what could not be resolved
struct Resolved<'n> {
    ids: Vec<String>,
    names: Vec<&'n String>,
    report: AttachmentReport,
}

/// Resolve each name with `lookup`
///
/// Only a `NotFound` lookup skips a name. Any other lookup error is recorded
/// as the report's failure.
async fn resolve_all<'n, F, Fut>(names: &'n [String], mut lookup: F) -> Resolved<'n>
where
    F: FnMut(&'n str) -> Fut,
    Fut: std::future::Future<Output = Result<String>>,
{
    let mut resolved = Resolved {
        ids: Vec::new(),
        names: Vec::new(),
        report: AttachmentReport::default(),
    };

    for name in names {
        match lookup(name.as_str()).await {
            Ok(id) => {
                resolved.ids.push(id);
                resolved.names.push(name);
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(name = %name, "skipping unknown name");
                resolved.report.skipped.push(name.clone());
            }
            Err(e) => resolved.report.fail(&e),
        }
    }

    resolved
}

/// Attach `labels` to the labelable node `labelable_id`
pub async fn attach_labels(
    client: &GitHubClient,
    ctx: &OperationContext,
    owner: &str,
    repo: &str,
    labelable_id: &str,
    labels: &[String],
) -> AttachmentReport {
    if labels.is_empty() {
        return AttachmentReport::default();
    }

    let resolver = IdentifierResolver::new(client);
    let Resolved {
        ids,
        names,
        mut report,
    } = resolve_all(labels, |name| resolver.label_id(ctx, owner, repo, name)).await;
    if ids.is_empty() {
        return report;
    }

    let result = client
        .graphql()
        .execute(
            ctx,
            ADD_LABELS_MUTATION,
            json!({ "labelableId": labelable_id, "labelIds": ids }),
        )
        .await;
    match result {
        Ok(_) => report.attached = names.into_iter().cloned().collect(),
        Err(e) => report.fail(&e),
    }
    report
}

/// Attach the users in `logins` to the assignable node `assignable_id`
pub async fn attach_assignees(
    client: &GitHubClient,
    ctx: &OperationContext,
    assignable_id: &str,
    logins: &[String],
) -> AttachmentReport {
    if logins.is_empty() {
        return AttachmentReport::default();
    }

    let resolver = IdentifierResolver::new(client);
    let Resolved {
        ids,
        names,
        mut report,
    } = resolve_all(logins, |login| resolver.user_id(ctx, login)).await;
    if ids.is_empty() {
        return report;
    }

    let result = client
        .graphql()
        .execute(
            ctx,
            ADD_ASSIGNEES_MUTATION,
            json!({ "assignableId": assignable_id, "assigneeIds": ids }),
        )
        .await;
    match result {
        Ok(_) => report.attached = names.into_iter().cloned().collect(),
        Err(e) => report.fail(&e),
    }
    report
}

/// Attach labels and assignees to a pull request through the issues REST API
///
/// Names are checked against GitHub first so unknown labels are skipped
/// rather than created.
pub async fn attach_to_pull_request(
    client: &GitHubClient,
    ctx: &OperationContext,
    owner: &str,
    repo: &str,
    number: u64,
    labels: &[String],
    assignees: &[String],
) -> AttachmentReport {
    if labels.is_empty() && assignees.is_empty() {
        return AttachmentReport::default();
    }

    let resolver = IdentifierResolver::new(client);
    let labels = resolve_all(labels, |name| resolver.label_id(ctx, owner, repo, name)).await;
    let users = resolve_all(assignees, |login| resolver.user_id(ctx, login)).await;
    let (known_labels, known_users) = (labels.names, users.names);
    let mut report = labels.report;
    report.merge(users.report);

    if known_labels.is_empty() && known_users.is_empty() {
        return report;
    }

    let mut body = serde_json::Map::new();
    if !known_labels.is_empty() {
        body.insert("labels".to_string(), json!(known_labels));
    }
    if !known_users.is_empty() {
        body.insert("assignees".to_string(), json!(known_users));
    }

    let path = format!("/repos/{}/{}/issues/{}", owner, repo, number);
    let result = client
        .rest()
        .request(ctx, RestMethod::Patch, &path, Some(body.into()))
        .await;
    match result {
        Ok(_) => {
            report
                .attached
                .extend(known_labels.into_iter().chain(known_users).cloned());
        }
        Err(e) => report.fail(&e),
    }
    report
}
