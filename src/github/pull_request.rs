//! Pull request operations
//!
//! Pull requests are opened through REST and listed/closed through GraphQL.
//! GitHub cannot delete a pull request, so cleanup closes it instead.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::preserve::PreserveCandidate;
use crate::core::OperationContext;
use crate::error::{LayeredError, Result};
use crate::github::attach::attach_to_pull_request;
use crate::github::client::GitHubClient;
use crate::github::item::{is_zero, require_title, CreatedItemInfo, ItemKind};
use crate::github::pagination::{paginate, NamedNode, NodeList, PAGE_SIZE};
use crate::github::transport::RestMethod;

const LIST_PULL_REQUESTS_QUERY: &str = r#"
query ListPullRequests($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: $first, after: $cursor, states: [OPEN]) {
      nodes {
        id
        number
        title
        body
        headRefName
        baseRefName
        isDraft
        labels(first: 100) {
          nodes {
            name
          }
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

const CLOSE_PULL_REQUEST_MUTATION: &str = r#"
mutation ClosePullRequest($pullRequestId: ID!) {
  closePullRequest(input: { pullRequestId: $pullRequestId }) {
    pullRequest {
      id
    }
  }
}
"#;

/// A pull request, as read from `prs.json` or listed from GitHub
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Head branch (source branch with changes)
    pub head: String,
    /// Base branch (target branch to merge into)
    pub base: String,
    /// Create as draft
    #[serde(default)]
    pub draft: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl PullRequest {
    /// Check head/base/title without touching the network
    pub fn validate(&self) -> Result<()> {
        const OPERATION: &str = "create pull request";

        if self.head.trim().is_empty() {
            return Err(LayeredError::validation(OPERATION, "head branch is required")
                .with_context("title", self.title.clone())
                .into());
        }
        if self.base.trim().is_empty() {
            return Err(LayeredError::validation(OPERATION, "base branch is required")
                .with_context("title", self.title.clone())
                .into());
        }
        if self.head == self.base {
            return Err(LayeredError::validation(
                OPERATION,
                format!("head and base branches must differ (both are '{}')", self.head),
            )
            .with_context("title", self.title.clone())
            .into());
        }
        require_title(OPERATION, &self.title)
    }
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    node_id: String,
    number: u64,
    title: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    id: String,
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    head_ref_name: String,
    base_ref_name: String,
    #[serde(default)]
    is_draft: bool,
    #[serde(default)]
    labels: Option<NodeList<NamedNode>>,
}

impl From<PullRequestNode> for PullRequest {
    fn from(node: PullRequestNode) -> Self {
        PullRequest {
            node_id: node.id,
            number: node.number,
            title: node.title,
            body: node.body,
            head: node.head_ref_name,
            base: node.base_ref_name,
            draft: node.is_draft,
            labels: node
                .labels
                .unwrap_or_default()
                .nodes
                .into_iter()
                .map(|l| l.name)
                .collect(),
            assignees: Vec::new(),
        }
    }
}

impl PreserveCandidate for PullRequest {
    fn preserve_id(&self) -> &str {
        &self.node_id
    }

    fn preserve_title(&self) -> &str {
        &self.title
    }

    fn preserve_labels(&self) -> &[String] {
        &self.labels
    }
}

/// Pull request operations handler
pub struct PullRequestHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Open a pull request, then attach its labels and assignees
    pub async fn create(&self, ctx: &OperationContext, pr: PullRequest) -> Result<CreatedItemInfo> {
        pr.validate()?;

        let (owner, repo) = self.client.target()?;
        let route = format!("/repos/{}/{}/pulls", owner, repo);
        let body = json!({
            "title": pr.title,
            "body": pr.body,
            "head": pr.head,
            "base": pr.base,
            "draft": pr.draft,
        });

        let response = self
            .client
            .rest()
            .request(ctx, RestMethod::Post, &route, Some(body))
            .await?;
        let created: PullRequestResponse = serde_json::from_value(response).map_err(|e| {
            LayeredError::api("create pull request", "unexpected pull request response")
                .with_cause(e)
        })?;
        tracing::info!(number = created.number, title = %created.title, "created pull request");

        attach_to_pull_request(
            self.client,
            ctx,
            &owner,
            &repo,
            created.number,
            &pr.labels,
            &pr.assignees,
        )
        .await
        .log("labels and assignees", &format!("pull request #{}", created.number));

        Ok(CreatedItemInfo {
            node_id: created.node_id,
            title: created.title,
            kind: ItemKind::PullRequest,
            number: created.number,
            url: created.html_url,
        })
    }

    /// List open pull requests
    pub async fn list(&self, ctx: &OperationContext) -> Result<Vec<PullRequest>> {
        let (owner, repo) = self.client.target()?;
        let nodes: Vec<PullRequestNode> = paginate(
            self.client.graphql(),
            ctx,
            "list pull requests",
            LIST_PULL_REQUESTS_QUERY,
            json!({ "owner": owner, "name": repo, "first": PAGE_SIZE }),
            &["repository", "pullRequests"],
        )
        .await?;

        Ok(nodes.into_iter().map(PullRequest::from).collect())
    }

    /// Remove the pull request with `node_id` by closing it
    pub async fn delete(&self, ctx: &OperationContext, node_id: &str) -> Result<()> {
        self.client
            .graphql()
            .execute(
                ctx,
                CLOSE_PULL_REQUEST_MUTATION,
                json!({ "pullRequestId": node_id }),
            )
            .await?;
        tracing::info!(node_id, "closed pull request");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Layer;
    use crate::github::client::testing::client;
    use crate::github::transport::{MockGraphqlTransport, MockRestTransport};

    fn pr(head: &str, base: &str) -> PullRequest {
        PullRequest {
            title: "Demo".to_string(),
            head: head.to_string(),
            base: base.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_branches_fail_before_any_call() {
        // Mocks without expectations panic if called
        let client = client(MockGraphqlTransport::new(), MockRestTransport::new());
        let handler = PullRequestHandler::new(&client);
        let ctx = OperationContext::new();

        let mut messages = Vec::new();
        for input in [pr("", "main"), pr("x", ""), pr("main", "main")] {
            let err = handler.create(&ctx, input).await.unwrap_err();
            assert_eq!(err.layer(), Some(Layer::Validation));
            messages.push(err.to_string());
        }

        assert!(messages[0].contains("head branch is required"));
        assert!(messages[1].contains("base branch is required"));
        assert!(messages[2].contains("must differ"));
        messages.dedup();
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_branch_checks_come_before_title() {
        let untitled = PullRequest {
            head: String::new(),
            base: "main".to_string(),
            ..Default::default()
        };
        assert!(untitled
            .validate()
            .unwrap_err()
            .to_string()
            .contains("head branch is required"));
    }

    #[tokio::test]
    async fn test_create_posts_to_pulls() {
        let mut rest = MockRestTransport::new();
        rest.expect_request()
            .withf(|_, method, path, body| {
                *method == RestMethod::Post
                    && path == "/repos/octo/demo/pulls"
                    && body.as_ref().map(|b| b["head"] == "feature/demo").unwrap_or(false)
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(json!({
                    "node_id": "PR_1",
                    "number": 5,
                    "title": "Demo",
                    "html_url": "https://github.com/octo/demo/pull/5"
                }))
            });

        let client = client(MockGraphqlTransport::new(), rest);
        let info = PullRequestHandler::new(&client)
            .create(&OperationContext::new(), pr("feature/demo", "main"))
            .await
            .unwrap();

        assert_eq!(info.kind, ItemKind::PullRequest);
        assert_eq!(info.node_id, "PR_1");
        assert_eq!(info.url, "https://github.com/octo/demo/pull/5");
    }

    #[tokio::test]
    async fn test_list_and_close() {
        let mut graphql = MockGraphqlTransport::new();
        graphql
            .expect_execute()
            .withf(|_, query, _| query.contains("ListPullRequests"))
            .times(1)
            .returning(|_, _, _| {
                Ok(json!({ "repository": { "pullRequests": {
                    "nodes": [{
                        "id": "PR_1", "number": 5, "title": "Demo", "body": "",
                        "headRefName": "feature/demo", "baseRefName": "main",
                        "isDraft": true, "labels": { "nodes": [{ "name": "demo" }] }
                    }],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                }}}))
            });
        graphql
            .expect_execute()
            .withf(|_, query, vars| {
                query.contains("closePullRequest") && vars["pullRequestId"] == "PR_1"
            })
            .times(1)
            .returning(|_, _, _| Ok(json!({ "closePullRequest": { "pullRequest": { "id": "PR_1" } } })));

        let client = client(graphql, MockRestTransport::new());
        let handler = PullRequestHandler::new(&client);
        let ctx = OperationContext::new();

        let prs = handler.list(&ctx).await.unwrap();
        assert_eq!(prs[0].head, "feature/demo");
        assert!(prs[0].draft);
        handler.delete(&ctx, &prs[0].node_id).await.unwrap();
    }
}
