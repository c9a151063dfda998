//! Issue operations

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::preserve::PreserveCandidate;
use crate::core::OperationContext;
use crate::error::Result;
use crate::github::attach::{attach_assignees, attach_labels};
use crate::github::client::GitHubClient;
use crate::github::item::{is_zero, require_title, CreatedItemInfo, CreatedNode, ItemKind};
use crate::github::pagination::{extract, paginate, NamedNode, NodeList, PAGE_SIZE};
use crate::github::resolver::IdentifierResolver;

const CREATE_ISSUE_MUTATION: &str = r#"
mutation CreateIssue($repositoryId: ID!, $title: String!, $body: String) {
  createIssue(input: { repositoryId: $repositoryId, title: $title, body: $body }) {
    issue {
      id
      number
      title
      url
    }
  }
}
"#;

const LIST_ISSUES_QUERY: &str = r#"
query ListIssues($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    issues(first: $first, after: $cursor) {
      nodes {
        id
        number
        title
        body
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

const DELETE_ISSUE_MUTATION: &str = r#"
mutation DeleteIssue($issueId: ID!) {
  deleteIssue(input: { issueId: $issueId }) {
    clientMutationId
  }
}
"#;

/// An issue, as read from `issues.json` or listed from GitHub
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Assigned by GitHub; empty before creation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Label names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// User logins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    id: String,
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    labels: Option<NodeList<NamedNode>>,
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        Issue {
            node_id: node.id,
            number: node.number,
            title: node.title,
            body: node.body,
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

impl PreserveCandidate for Issue {
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

/// Issue operations handler
pub struct IssueHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> IssueHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Create an issue, then attach its labels and assignees
    pub async fn create(&self, ctx: &OperationContext, issue: Issue) -> Result<CreatedItemInfo> {
        require_title("create issue", &issue.title)?;

        let (owner, repo) = self.client.target()?;
        let repository_id = IdentifierResolver::new(self.client)
            .repository_id(ctx, &owner, &repo)
            .await?;

        let data = self
            .client
            .graphql()
            .execute(
                ctx,
                CREATE_ISSUE_MUTATION,
                json!({
                    "repositoryId": repository_id,
                    "title": issue.title,
                    "body": issue.body,
                }),
            )
            .await?;
        let created: CreatedNode = extract("create issue", &data, &["createIssue", "issue"])?;
        tracing::info!(number = created.number, title = %created.title, "created issue");

        let target = format!("issue #{}", created.number);
        attach_labels(self.client, ctx, &owner, &repo, &created.id, &issue.labels)
            .await
            .log("labels", &target);
        attach_assignees(self.client, ctx, &created.id, &issue.assignees)
            .await
            .log("assignees", &target);

        Ok(created.into_info(ItemKind::Issue))
    }

    /// List every issue in the repository, open and closed
    pub async fn list(&self, ctx: &OperationContext) -> Result<Vec<Issue>> {
        let (owner, repo) = self.client.target()?;
        let nodes: Vec<IssueNode> = paginate(
            self.client.graphql(),
            ctx,
            "list issues",
            LIST_ISSUES_QUERY,
            json!({ "owner": owner, "name": repo, "first": PAGE_SIZE }),
            &["repository", "issues"],
        )
        .await?;

        Ok(nodes.into_iter().map(Issue::from).collect())
    }

    /// Delete the issue with `node_id`
    pub async fn delete(&self, ctx: &OperationContext, node_id: &str) -> Result<()> {
        self.client
            .graphql()
            .execute(ctx, DELETE_ISSUE_MUTATION, json!({ "issueId": node_id }))
            .await?;
        tracing::info!(node_id, "deleted issue");
        Ok(())
    }
}
