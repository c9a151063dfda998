//! Discussion operations

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::preserve::PreserveCandidate;
use crate::core::OperationContext;
use crate::error::Result;
use crate::github::attach::attach_labels;
use crate::github::client::GitHubClient;
use crate::github::item::{is_zero, require_title, CreatedItemInfo, CreatedNode, ItemKind};
use crate::github::pagination::{extract, paginate, NamedNode, NodeList, PAGE_SIZE};
use crate::github::resolver::IdentifierResolver;

const CREATE_DISCUSSION_MUTATION: &str = r#"
mutation CreateDiscussion($repositoryId: ID!, $categoryId: ID!, $title: String!, $body: String!) {
  createDiscussion(input: { repositoryId: $repositoryId, categoryId: $categoryId, title: $title, body: $body }) {
    discussion {
      id
      number
      title
      url
    }
  }
}
"#;

const LIST_DISCUSSIONS_QUERY: &str = r#"
query ListDiscussions($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    discussions(first: $first, after: $cursor) {
      nodes {
        id
        number
        title
        body
        category {
          name
        }
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

const DELETE_DISCUSSION_MUTATION: &str = r#"
mutation DeleteDiscussion($id: ID!) {
  deleteDiscussion(input: { id: $id }) {
    clientMutationId
  }
}
"#;

/// A discussion, as read from `discussions.json` or listed from GitHub
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_id: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Category name; must match a repository category exactly
    pub category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DiscussionNode {
    id: String,
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    category: Option<NamedNode>,
    #[serde(default)]
    labels: Option<NodeList<NamedNode>>,
}

impl From<DiscussionNode> for Discussion {
    fn from(node: DiscussionNode) -> Self {
        Discussion {
            node_id: node.id,
            number: node.number,
            title: node.title,
            body: node.body,
            category: node.category.map(|c| c.name).unwrap_or_default(),
            labels: node
                .labels
                .unwrap_or_default()
                .nodes
                .into_iter()
                .map(|l| l.name)
                .collect(),
        }
    }
}

impl PreserveCandidate for Discussion {
    fn preserve_id(&self) -> &str {
        &self.node_id
    }

    fn preserve_title(&self) -> &str {
        &self.title
    }

    fn preserve_labels(&self) -> &[String] {
        &self.labels
    }

    fn preserve_category(&self) -> Option<&str> {
        Some(self.category.as_str()).filter(|c| !c.is_empty())
    }
}

/// Discussion operations handler
pub struct DiscussionHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> DiscussionHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Create a discussion in its named category, then attach labels
    ///
    /// An unknown category fails the creation; unknown labels are skipped.
    pub async fn create(
        &self,
        ctx: &OperationContext,
        discussion: Discussion,
    ) -> Result<CreatedItemInfo> {
        require_title("create discussion", &discussion.title)?;

        let (owner, repo) = self.client.target()?;
        let resolver = IdentifierResolver::new(self.client);
        let repository_id = resolver.repository_id(ctx, &owner, &repo).await?;
        let category_id = resolver
            .category_id(ctx, &owner, &repo, &discussion.category)
            .await?;

        let data = self
            .client
            .graphql()
            .execute(
                ctx,
                CREATE_DISCUSSION_MUTATION,
                json!({
                    "repositoryId": repository_id,
                    "categoryId": category_id,
                    "title": discussion.title,
                    "body": discussion.body,
                }),
            )
            .await?;
        let created: CreatedNode =
            extract("create discussion", &data, &["createDiscussion", "discussion"])?;
        tracing::info!(number = created.number, title = %created.title, "created discussion");

        attach_labels(self.client, ctx, &owner, &repo, &created.id, &discussion.labels)
            .await
            .log("labels", &format!("discussion #{}", created.number));

        Ok(created.into_info(ItemKind::Discussion))
    }

    /// List every discussion in the repository
    pub async fn list(&self, ctx: &OperationContext) -> Result<Vec<Discussion>> {
        let (owner, repo) = self.client.target()?;
        let nodes: Vec<DiscussionNode> = paginate(
            self.client.graphql(),
            ctx,
            "list discussions",
            LIST_DISCUSSIONS_QUERY,
            json!({ "owner": owner, "name": repo, "first": PAGE_SIZE }),
            &["repository", "discussions"],
        )
        .await?;

        Ok(nodes.into_iter().map(Discussion::from).collect())
    }

    /// Delete the discussion with `node_id`
    pub async fn delete(&self, ctx: &OperationContext, node_id: &str) -> Result<()> {
        self.client
            .graphql()
            .execute(ctx, DELETE_DISCUSSION_MUTATION, json!({ "id": node_id }))
            .await?;
        tracing::info!(node_id, "deleted discussion");
        Ok(())
    }
}
