//! Receipts for created items

use serde::{Deserialize, Serialize};

use crate::error::{LayeredError, Result};

/// Kind of content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Issue,
    Discussion,
    PullRequest,
    Label,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::Discussion => "discussion",
            ItemKind::PullRequest => "pull_request",
            ItemKind::Label => "label",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// What a creator returns once an item exists on GitHub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedItemInfo {
    /// Node ID, or the label name for labels
    pub node_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Issue/discussion/PR number; 0 for labels
    pub number: u64,
    pub url: String,
}

/// Fields GitHub returns for a freshly created issue, discussion or PR
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedNode {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub url: String,
}

impl CreatedNode {
    pub fn into_info(self, kind: ItemKind) -> CreatedItemInfo {
        CreatedItemInfo {
            node_id: self.id,
            title: self.title,
            kind,
            number: self.number,
            url: self.url,
        }
    }
}

pub(crate) fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Reject an empty title before any network call
pub(crate) fn require_title(operation: &str, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(LayeredError::validation(operation, "title must not be empty").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_type() {
        let info = CreatedItemInfo {
            node_id: "I_1".to_string(),
            title: "Demo".to_string(),
            kind: ItemKind::PullRequest,
            number: 3,
            url: "https://github.com/o/r/pull/3".to_string(),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], "pull_request");
        assert_eq!(ItemKind::Issue.to_string(), "issue");
    }

    #[test]
    fn test_require_title() {
        assert!(require_title("create issue", "Demo").is_ok());
        let err = require_title("create issue", "  ").unwrap_err();
        assert_eq!(err.layer(), Some(crate::error::Layer::Validation));
    }
}
