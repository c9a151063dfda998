//! Cursor pagination over GraphQL connections
//!
//! Queries passed to [`paginate`] must declare a `$cursor: String` variable
//! and select `nodes` plus `pageInfo { hasNextPage endCursor }` on the
//! connection found at `path`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::core::OperationContext;
use crate::error::{LayeredError, Result};
use crate::github::transport::GraphqlTransport;

/// Page size used for every connection
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

/// A `nodes` list without paging, e.g. the labels on an issue
#[derive(Debug, Clone, Deserialize)]
pub struct NodeList<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// Just the name of a label
#[derive(Debug, Clone, Deserialize)]
pub struct NamedNode {
    pub name: String,
}

/// Pull `path` out of a GraphQL `data` object and decode it
pub fn extract<T: DeserializeOwned>(operation: &str, data: &Value, path: &[&str]) -> Result<T> {
    let mut current = data;
    for segment in path {
        current = current.get(segment).filter(|v| !v.is_null()).ok_or_else(|| {
            LayeredError::api(operation, format!("response is missing '{}'", path.join(".")))
        })?;
    }

    serde_json::from_value(current.clone()).map_err(|e| {
        LayeredError::api(operation, format!("cannot decode '{}'", path.join(".")))
            .with_cause(e)
            .into()
    })
}

/// Fetch every page of the connection at `path`
pub async fn paginate<T: DeserializeOwned>(
    transport: &dyn GraphqlTransport,
    ctx: &OperationContext,
    operation: &str,
    query: &str,
    mut variables: Value,
    path: &[&str],
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        variables["cursor"] = cursor.clone().map(Value::String).unwrap_or(Value::Null);
        let data = transport.execute(ctx, query, variables.clone()).await?;
        let page: Connection<T> = extract(operation, &data, path)?;
        pages += 1;

        items.extend(page.nodes);

        match (page.page_info.has_next_page, page.page_info.end_cursor) {
            (true, Some(next)) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            _ => break,
        }
    }

    tracing::debug!(operation, pages, count = items.len(), "pagination complete");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::transport::MockGraphqlTransport;
    use mockall::Sequence;
    use serde_json::json;

    const QUERY: &str = "query Labels($cursor: String) { }";

    #[tokio::test]
    async fn test_accumulates_all_pages() {
        let mut transport = MockGraphqlTransport::new();
        let mut seq = Sequence::new();

        transport
            .expect_execute()
            .withf(|_, _, vars| vars["cursor"].is_null())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(json!({ "repository": { "labels": {
                    "nodes": [{ "name": "bug" }, { "name": "docs" }],
                    "pageInfo": { "hasNextPage": true, "endCursor": "c1" }
                }}}))
            });
        transport
            .expect_execute()
            .withf(|_, _, vars| vars["cursor"] == "c1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(json!({ "repository": { "labels": {
                    "nodes": [{ "name": "feature" }],
                    "pageInfo": { "hasNextPage": false, "endCursor": "c2" }
                }}}))
            });

        let ctx = OperationContext::new();
        let labels: Vec<NamedNode> = paginate(
            &transport,
            &ctx,
            "list labels",
            QUERY,
            json!({ "owner": "octo" }),
            &["repository", "labels"],
        )
        .await
        .unwrap();

        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["bug", "docs", "feature"]);
    }

    #[tokio::test]
    async fn test_missing_connection_is_api_error() {
        let mut transport = MockGraphqlTransport::new();
        transport
            .expect_execute()
            .returning(|_, _, _| Ok(json!({ "repository": null })));

        let ctx = OperationContext::new();
        let err = paginate::<NamedNode>(
            &transport,
            &ctx,
            "list labels",
            QUERY,
            json!({}),
            &["repository", "labels"],
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("repository.labels"));
    }

    #[tokio::test]
    async fn test_repeated_cursor_stops() {
        let mut transport = MockGraphqlTransport::new();
        transport.expect_execute().times(2).returning(|_, _, _| {
            Ok(json!({ "repository": { "labels": {
                "nodes": [{ "name": "loop" }],
                "pageInfo": { "hasNextPage": true, "endCursor": "same" }
            }}}))
        });

        let ctx = OperationContext::new();
        let labels: Vec<NamedNode> = paginate(
            &transport,
            &ctx,
            "list labels",
            QUERY,
            json!({}),
            &["repository", "labels"],
        )
        .await
        .unwrap();
        assert_eq!(labels.len(), 2);
    }
}
