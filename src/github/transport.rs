//! GraphQL and REST transports
//!
//! Creators, listers and the resolver depend on these traits only. The
//! octocrab-backed [`OctocrabTransport`] implements both.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::OperationContext;
use crate::error::{LayeredError, Result, SeedError};
use crate::github::error_handler::classify_github_error;

/// HTTP method for a REST call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Post,
    Patch,
}

impl std::fmt::Display for RestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// Executes GraphQL queries and mutations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Run `query` with `variables`, returning the `data` object
    async fn execute(&self, ctx: &OperationContext, query: &str, variables: Value)
        -> Result<Value>;
}

/// Executes REST calls against the GitHub API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Send `body` to `path` with `method`, returning the decoded JSON body
    async fn request(
        &self,
        ctx: &OperationContext,
        method: RestMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

const NOT_FOUND_TYPE: &str = "NOT_FOUND";

/// Reduce a raw GraphQL response to its `data`
///
/// Any `errors` entry fails the call. When every entry is `NOT_FOUND` the
/// error carries `graphql_type=NOT_FOUND` so lookups can tell absence apart
/// from a real failure; see [`is_not_found_response`].
pub(crate) fn unwrap_graphql_response(operation: &str, raw: Value) -> Result<Value> {
    let envelope: GraphqlEnvelope = serde_json::from_value(raw).map_err(|e| {
        LayeredError::api(operation, "unexpected GraphQL response shape").with_cause(e)
    })?;

    if !envelope.errors.is_empty() {
        let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
        let mut err = LayeredError::api(operation, messages.join("; "));
        if envelope
            .errors
            .iter()
            .all(|e| e.kind.as_deref() == Some(NOT_FOUND_TYPE))
        {
            err = err.with_context("graphql_type", NOT_FOUND_TYPE);
        }
        return Err(err.into());
    }

    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(LayeredError::api(operation, "response contained no data").into()),
    }
}

/// Whether `err` is a GraphQL response whose only errors were `NOT_FOUND`
pub fn is_not_found_response(err: &SeedError) -> bool {
    match err {
        SeedError::Layered(e) => {
            e.context_map().get("graphql_type").map(String::as_str) == Some(NOT_FOUND_TYPE)
        }
        _ => false,
    }
}

/// First word of a GraphQL document after the operation keyword, for logs
fn operation_name(query: &str) -> &str {
    query
        .split_whitespace()
        .find(|w| *w != "query" && *w != "mutation")
        .map(|w| w.split(|c| c == '(' || c == '{').next().unwrap_or(w))
        .filter(|w| !w.is_empty())
        .unwrap_or("graphql")
}

/// Transport backed by an authenticated octocrab instance
pub struct OctocrabTransport {
    inner: Octocrab,
}

impl OctocrabTransport {
    pub fn new(inner: Octocrab) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl GraphqlTransport for OctocrabTransport {
    async fn execute(
        &self,
        ctx: &OperationContext,
        query: &str,
        variables: Value,
    ) -> Result<Value> {
        let operation = operation_name(query);
        tracing::debug!(operation, "graphql request");

        let payload = json!({ "query": query, "variables": variables });
        let raw = ctx
            .run(operation, async {
                self.inner
                    .graphql::<Value>(&payload)
                    .await
                    .map_err(|e| SeedError::from(classify_github_error(e, operation)))
            })
            .await?;

        unwrap_graphql_response(operation, raw)
    }
}

#[async_trait]
impl RestTransport for OctocrabTransport {
    async fn request(
        &self,
        ctx: &OperationContext,
        method: RestMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let operation = format!("{} {}", method, path);
        tracing::debug!(%method, path, "rest request");

        ctx.run(&operation, async {
            let response: std::result::Result<Value, octocrab::Error> = match method {
                RestMethod::Post => self.inner.post(path, body.as_ref()).await,
                RestMethod::Patch => self.inner.patch(path, body.as_ref()).await,
            };
            response.map_err(|e| SeedError::from(classify_github_error(e, &operation)))
        })
        .await
    }
}
