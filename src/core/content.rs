//! Demo content files
//!
//! A content directory holds up to four JSON arrays: `issues.json`,
//! `discussions.json`, `prs.json` and `labels.json`. A missing file means no
//! items of that kind.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{LayeredError, Result};
use crate::github::{Discussion, Issue, ItemKind, Label, PullRequest};

pub const ISSUES_FILE: &str = "issues.json";
pub const DISCUSSIONS_FILE: &str = "discussions.json";
pub const PULL_REQUESTS_FILE: &str = "prs.json";
pub const LABELS_FILE: &str = "labels.json";
pub const PRESERVE_FILE: &str = "preserve.json";

/// Everything a create run will seed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedContent {
    pub labels: Vec<Label>,
    pub issues: Vec<Issue>,
    pub discussions: Vec<Discussion>,
    pub pull_requests: Vec<PullRequest>,
}

impl SeedContent {
    /// Load all content files from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(LayeredError::file("load content", "content directory does not exist")
                .with_context("path", dir.display().to_string())
                .into());
        }

        Ok(Self {
            labels: load_items(&dir.join(LABELS_FILE))?,
            issues: load_items(&dir.join(ISSUES_FILE))?,
            discussions: load_items(&dir.join(DISCUSSIONS_FILE))?,
            pull_requests: load_items(&dir.join(PULL_REQUESTS_FILE))?,
        })
    }

    /// Drop every kind for which `keep` is false
    pub fn retain_kinds(mut self, keep: impl Fn(ItemKind) -> bool) -> Self {
        if !keep(ItemKind::Label) {
            self.labels.clear();
        }
        if !keep(ItemKind::Issue) {
            self.issues.clear();
        }
        if !keep(ItemKind::Discussion) {
            self.discussions.clear();
        }
        if !keep(ItemKind::PullRequest) {
            self.pull_requests.clear();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.labels.len() + self.issues.len() + self.discussions.len() + self.pull_requests.len()
    }

    /// Validate every pull request before anything is sent
    pub fn validate(&self) -> Result<()> {
        for pr in &self.pull_requests {
            pr.validate()?;
        }
        Ok(())
    }
}

/// Read a JSON array of items; a missing file is an empty list
pub fn load_items<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "content file not present");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(LayeredError::file("load content", "cannot read content file")
                .with_context("path", path.display().to_string())
                .with_cause(e)
                .into());
        }
    };

    let items: Vec<T> = serde_json::from_str(&contents).map_err(|e| {
        LayeredError::config("load content", "content file is not a valid JSON array")
            .with_context("path", path.display().to_string())
            .with_cause(e)
    })?;
    tracing::debug!(path = %path.display(), count = items.len(), "loaded content file");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Layer;

    #[test]
    fn test_load_partial_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(ISSUES_FILE),
            r#"[{"title": "First", "body": "Hello", "labels": ["bug"], "assignees": ["octocat"]}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(LABELS_FILE),
            r#"[{"name": "bug", "color": "d73a4a", "description": "Something is broken"}]"#,
        )
        .unwrap();

        let content = SeedContent::load(dir.path()).unwrap();
        assert_eq!(content.issues.len(), 1);
        assert_eq!(content.issues[0].assignees, vec!["octocat".to_string()]);
        assert_eq!(content.labels[0].color, "d73a4a");
        assert!(content.discussions.is_empty());
        assert!(content.pull_requests.is_empty());
        assert_eq!(content.len(), 2);
    }

    #[test]
    fn test_missing_directory_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SeedContent::load(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.layer(), Some(Layer::File));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DISCUSSIONS_FILE), r#"{"title": "not an array"}"#).unwrap();

        let err = SeedContent::load(dir.path()).unwrap_err();
        assert_eq!(err.layer(), Some(Layer::Config));
        assert!(err.to_string().contains(DISCUSSIONS_FILE));
    }

    #[test]
    fn test_validate_rejects_same_branches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PULL_REQUESTS_FILE),
            r#"[{"title": "Demo", "head": "main", "base": "main"}]"#,
        )
        .unwrap();

        let content = SeedContent::load(dir.path()).unwrap();
        assert_eq!(content.validate().unwrap_err().layer(), Some(Layer::Validation));
    }

    #[test]
    fn test_retain_kinds_drops_unselected_content() {
        let content = SeedContent {
            labels: vec![Label {
                name: "bug".to_string(),
                ..Default::default()
            }],
            pull_requests: vec![PullRequest {
                title: "Demo".to_string(),
                head: "main".to_string(),
                base: "main".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let labels_only = content.retain_kinds(|kind| kind == ItemKind::Label);
        assert_eq!(labels_only.len(), 1);
        assert!(labels_only.pull_requests.is_empty());
        assert!(labels_only.validate().is_ok());
    }
}
