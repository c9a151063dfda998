//! Label operations
//!
//! Labels are created through REST and identified by name. Listing and
//! deletion go through GraphQL.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::preserve::PreserveCandidate;
use crate::core::OperationContext;
use crate::error::{LayeredError, Result};
use crate::github::client::GitHubClient;
use crate::github::item::{CreatedItemInfo, ItemKind};
use crate::github::pagination::{paginate, PAGE_SIZE};
use crate::github::resolver::IdentifierResolver;
use crate::github::transport::RestMethod;

const LIST_LABELS_QUERY: &str = r#"
query ListLabels($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    labels(first: $first, after: $cursor) {
      nodes {
        id
        name
        color
        description
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

const DELETE_LABEL_MUTATION: &str = r#"
mutation DeleteLabel($id: ID!) {
  deleteLabel(input: { id: $id }) {
    clientMutationId
  }
}
"#;

/// A label, as read from `labels.json` or listed from GitHub
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_id: String,
    pub name: String,
    /// Hex color, with or without a leading `#`
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    id: String,
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<LabelNode> for Label {
    fn from(node: LabelNode) -> Self {
        Label {
            node_id: node.id,
            name: node.name,
            color: node.color,
            description: node.description.unwrap_or_default(),
        }
    }
}

/// Labels are identified by name; `preserve_by_id` accepts the name or the node ID
impl PreserveCandidate for Label {
    fn preserve_id(&self) -> &str {
        &self.name
    }

    fn preserve_title(&self) -> &str {
        &self.name
    }

    fn matches_id(&self, id: &str) -> bool {
        id == self.name || (!self.node_id.is_empty() && id == self.node_id)
    }
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    name: String,
}

/// Browser URL for the issues carrying a label
fn label_url(owner: &str, repo: &str, name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!(
        "https://github.com/{}/{}/labels/{}",
        owner,
        repo,
        encoded.replace('+', "%20")
    )
}

/// Label operations handler
pub struct LabelHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> LabelHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Create a label; the returned identifier is its name
    ///
    /// Existing labels are not checked first, so a duplicate name fails with
    /// GitHub's own error.
    pub async fn create(&self, ctx: &OperationContext, label: Label) -> Result<CreatedItemInfo> {
        if label.name.trim().is_empty() {
            return Err(LayeredError::validation("create label", "name must not be empty").into());
        }

        let (owner, repo) = self.client.target()?;
        let route = format!("/repos/{}/{}/labels", owner, repo);

        let mut body = json!({ "name": label.name });
        let color = label.color.trim_start_matches('#');
        if !color.is_empty() {
            body["color"] = json!(color);
        }
        if !label.description.is_empty() {
            body["description"] = json!(label.description);
        }

        let response = self
            .client
            .rest()
            .request(ctx, RestMethod::Post, &route, Some(body))
            .await?;
        let created: LabelResponse = serde_json::from_value(response).map_err(|e| {
            LayeredError::api("create label", "unexpected label response").with_cause(e)
        })?;
        tracing::info!(name = %created.name, "created label");

        Ok(CreatedItemInfo {
            node_id: created.name.clone(),
            title: created.name.clone(),
            kind: ItemKind::Label,
            number: 0,
            url: label_url(&owner, &repo, &created.name),
        })
    }

    /// List every label in the repository
    pub async fn list(&self, ctx: &OperationContext) -> Result<Vec<Label>> {
        let (owner, repo) = self.client.target()?;
        let nodes: Vec<LabelNode> = paginate(
            self.client.graphql(),
            ctx,
            "list labels",
            LIST_LABELS_QUERY,
            json!({ "owner": owner, "name": repo, "first": PAGE_SIZE }),
            &["repository", "labels"],
        )
        .await?;

        Ok(nodes.into_iter().map(Label::from).collect())
    }

    /// Delete the label called `name`
    pub async fn delete(&self, ctx: &OperationContext, name: &str) -> Result<()> {
        let (owner, repo) = self.client.target()?;
        let id = IdentifierResolver::new(self.client)
            .label_id(ctx, &owner, &repo, name)
            .await?;
        self.delete_by_id(ctx, &id).await
    }

    /// Delete the label with node ID `node_id`
    pub async fn delete_by_id(&self, ctx: &OperationContext, node_id: &str) -> Result<()> {
        self.client
            .graphql()
            .execute(ctx, DELETE_LABEL_MUTATION, json!({ "id": node_id }))
            .await?;
        tracing::info!(node_id, "deleted label");
        Ok(())
    }
}
