//! Name → node ID resolution
//!
//! Each lookup issues exactly one GraphQL query. Transport failures come back
//! as `api` errors; a successful query with an empty result is
//! [`SeedError::NotFound`] so callers can decide whether absence is fatal.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::OperationContext;
use crate::error::{LayeredError, Result, SeedError};
use crate::github::client::GitHubClient;
use crate::github::transport::is_not_found_response;

const REPOSITORY_ID_QUERY: &str = r#"
query RepositoryId($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
  }
}
"#;

const LABEL_ID_QUERY: &str = r#"
query LabelId($owner: String!, $name: String!, $label: String!) {
  repository(owner: $owner, name: $name) {
    label(name: $label) {
      id
    }
  }
}
"#;

const DISCUSSION_CATEGORIES_QUERY: &str = r#"
query DiscussionCategories($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    discussionCategories(first: 100) {
      nodes {
        id
        name
      }
    }
  }
}
"#;

const USER_ID_QUERY: &str = r#"
query UserId($login: String!) {
  user(login: $login) {
    id
  }
}
"#;

/// A discussion category configured on the repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscussionCategory {
    pub id: String,
    pub name: String,
}

/// Look up `id` at `path`, treating null anywhere along it as absent
fn optional_id(data: &Value, path: &[&str]) -> Option<String> {
    let mut current = data;
    for segment in path {
        current = current.get(segment)?;
    }
    current.as_str().filter(|id| !id.is_empty()).map(str::to_string)
}

/// Identifier lookup handler
pub struct IdentifierResolver<'a> {
    client: &'a GitHubClient,
}

impl<'a> IdentifierResolver<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Run a lookup query; a `NOT_FOUND`-only response reads as null data
    async fn lookup(
        &self,
        ctx: &OperationContext,
        query: &str,
        variables: Value,
    ) -> Result<Value> {
        match self.client.graphql().execute(ctx, query, variables).await {
            Err(e) if is_not_found_response(&e) => {
                tracing::debug!(error = %e, "lookup target does not exist");
                Ok(Value::Null)
            }
            other => other,
        }
    }

    /// Resolve the node ID of `owner/repo`
    pub async fn repository_id(
        &self,
        ctx: &OperationContext,
        owner: &str,
        repo: &str,
    ) -> Result<String> {
        let (owner, repo) = self.client.resolve_target(owner, repo)?;
        let data = self
            .lookup(
                ctx,
                REPOSITORY_ID_QUERY,
                json!({ "owner": owner, "name": repo }),
            )
            .await?;

        optional_id(&data, &["repository", "id"])
            .ok_or_else(|| SeedError::not_found("repository", format!("{}/{}", owner, repo)))
    }

    /// Resolve the node ID of the label called `name`
    pub async fn label_id(
        &self,
        ctx: &OperationContext,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<String> {
        let (owner, repo) = self.client.resolve_target(owner, repo)?;
        let data = self
            .lookup(
                ctx,
                LABEL_ID_QUERY,
                json!({ "owner": owner, "name": repo, "label": name }),
            )
            .await?;

        optional_id(&data, &["repository", "label", "id"])
            .ok_or_else(|| SeedError::not_found("label", name))
    }

    /// List the discussion categories of `owner/repo`
    pub async fn list_categories(
        &self,
        ctx: &OperationContext,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<DiscussionCategory>> {
        let (owner, repo) = self.client.resolve_target(owner, repo)?;
        let data = self
            .lookup(
                ctx,
                DISCUSSION_CATEGORIES_QUERY,
                json!({ "owner": owner, "name": repo }),
            )
            .await?;

        let nodes = data
            .get("repository")
            .and_then(|r| r.get("discussionCategories"))
            .and_then(|c| c.get("nodes"))
            .cloned()
            .unwrap_or(Value::Null);
        if nodes.is_null() {
            return Ok(Vec::new());
        }

        serde_json::from_value(nodes).map_err(|e| {
            LayeredError::api("list discussion categories", "cannot decode categories")
                .with_cause(e)
                .into()
        })
    }

    /// Resolve the node ID of the discussion category called `name`
    ///
    /// Matching is exact and case-sensitive.
    pub async fn category_id(
        &self,
        ctx: &OperationContext,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<String> {
        self.list_categories(ctx, owner, repo)
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .ok_or_else(|| SeedError::not_found("discussion category", name))
    }

    /// Resolve the node ID of the user with `login`
    pub async fn user_id(&self, ctx: &OperationContext, login: &str) -> Result<String> {
        let data = self
            .lookup(ctx, USER_ID_QUERY, json!({ "login": login }))
            .await?;

        optional_id(&data, &["user", "id"]).ok_or_else(|| SeedError::not_found("user", login))
    }
}
