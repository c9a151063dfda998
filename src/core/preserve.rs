//! Preserve rules for cleanup
//!
//! A preserve file exempts existing items from deletion. An item is kept if
//! any configured rule matches it:
//! - `preserve_by_title`: exact, case-sensitive title; entries starting with
//!   `^` are regular expressions
//! - `preserve_by_label` / `preserve_by_category`: item carries any listed name
//! - `preserve_by_id`: exact node ID

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LayeredError, Result};

/// Rules for one kind of item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreserveRules {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_by_title: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_by_label: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_by_category: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_by_id: Vec<String>,
}

/// Contents of `preserve.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreserveConfig {
    #[serde(default)]
    pub issues: PreserveRules,
    #[serde(default)]
    pub discussions: PreserveRules,
    #[serde(default)]
    pub pull_requests: PreserveRules,
    #[serde(default)]
    pub labels: PreserveRules,
}

/// Something cleanup may delete
pub trait PreserveCandidate {
    /// Node ID used for `preserve_by_id`
    fn preserve_id(&self) -> &str;
    /// Title (or name, for labels) used for `preserve_by_title`
    fn preserve_title(&self) -> &str;
    /// Labels the item carries
    fn preserve_labels(&self) -> &[String] {
        &[]
    }
    /// Discussion category, if any
    fn preserve_category(&self) -> Option<&str> {
        None
    }
    /// Whether a `preserve_by_id` entry names this item
    fn matches_id(&self, id: &str) -> bool {
        id == self.preserve_id()
    }
}

fn is_pattern(title_rule: &str) -> bool {
    title_rule.starts_with('^')
}

impl PreserveRules {
    pub fn is_empty(&self) -> bool {
        self.preserve_by_title.is_empty()
            && self.preserve_by_label.is_empty()
            && self.preserve_by_category.is_empty()
            && self.preserve_by_id.is_empty()
    }

    /// Check whether `title` matches any title rule
    pub fn matches_title(&self, title: &str) -> bool {
        self.preserve_by_title.iter().any(|rule| {
            if is_pattern(rule) {
                match Regex::new(rule) {
                    Ok(re) => re.is_match(title),
                    Err(e) => {
                        tracing::warn!(pattern = %rule, error = %e, "invalid preserve pattern, comparing literally");
                        rule == title
                    }
                }
            } else {
                rule == title
            }
        })
    }

    /// Decide whether `item` survives cleanup
    pub fn should_preserve<C: PreserveCandidate + ?Sized>(&self, item: &C) -> bool {
        if self.matches_title(item.preserve_title()) {
            return true;
        }

        if self.preserve_by_id.iter().any(|id| item.matches_id(id)) {
            return true;
        }

        if item
            .preserve_labels()
            .iter()
            .any(|label| self.preserve_by_label.contains(label))
        {
            return true;
        }

        item.preserve_category()
            .map(|category| self.preserve_by_category.iter().any(|c| c == category))
            .unwrap_or(false)
    }

    fn validate(&self, section: &str) -> Result<()> {
        for rule in self.preserve_by_title.iter().filter(|r| is_pattern(r)) {
            if let Err(e) = Regex::new(rule) {
                return Err(LayeredError::config(
                    "load preserve config",
                    format!("invalid title pattern in {}", section),
                )
                .with_context("pattern", rule.clone())
                .with_cause(e)
                .into());
            }
        }
        Ok(())
    }
}

impl PreserveConfig {
    /// Load a preserve file
    ///
    /// A missing file yields an empty config. Malformed JSON or an invalid
    /// title pattern is a `config` error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no preserve file, nothing will be preserved");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(LayeredError::file("load preserve config", "cannot read preserve file")
                    .with_context("path", path.display().to_string())
                    .with_cause(e)
                    .into());
            }
        };

        let config: PreserveConfig = serde_json::from_str(&contents).map_err(|e| {
            LayeredError::config("load preserve config", "preserve file is not valid JSON")
                .with_context("path", path.display().to_string())
                .with_cause(e)
        })?;

        config.issues.validate("issues")?;
        config.discussions.validate("discussions")?;
        config.pull_requests.validate("pull_requests")?;
        config.labels.validate("labels")?;

        Ok(config)
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            LayeredError::config("save preserve config", "cannot serialize preserve config")
                .with_cause(e)
        })?;
        fs::write(path, contents).map_err(|e| {
            LayeredError::file("save preserve config", "cannot write preserve file")
                .with_context("path", path.display().to_string())
                .with_cause(e)
        })?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
            && self.discussions.is_empty()
            && self.pull_requests.is_empty()
            && self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Layer;

    struct Item {
        id: String,
        title: String,
        labels: Vec<String>,
        category: Option<String>,
    }

    impl PreserveCandidate for Item {
        fn preserve_id(&self) -> &str {
            &self.id
        }
        fn preserve_title(&self) -> &str {
            &self.title
        }
        fn preserve_labels(&self) -> &[String] {
            &self.labels
        }
        fn preserve_category(&self) -> Option<&str> {
            self.category.as_deref()
        }
    }

    fn item(title: &str) -> Item {
        Item {
            id: "I_1".to_string(),
            title: title.to_string(),
            labels: vec!["bug".to_string()],
            category: Some("Ideas".to_string()),
        }
    }

    #[test]
    fn test_empty_rules_preserve_nothing() {
        let rules = PreserveRules::default();
        assert!(!rules.should_preserve(&item("Release 1.0")));
    }

    #[test]
    fn test_exact_title_is_case_sensitive() {
        let rules = PreserveRules {
            preserve_by_title: vec!["Release 1.0".to_string()],
            ..Default::default()
        };
        assert!(rules.should_preserve(&item("Release 1.0")));
        assert!(!rules.should_preserve(&item("release 1.0")));
        assert!(!rules.should_preserve(&item("Release 1.0.1")));
    }

    #[test]
    fn test_caret_title_is_regex() {
        let rules = PreserveRules {
            preserve_by_title: vec!["^Release.*".to_string()],
            ..Default::default()
        };
        assert!(rules.should_preserve(&item("Release 1.0")));
        assert!(rules.should_preserve(&item("Release")));
        assert!(!rules.should_preserve(&item("Pre-Release 1.0")));
    }

    #[test]
    fn test_non_caret_title_is_literal() {
        let rules = PreserveRules {
            preserve_by_title: vec!["Release.*".to_string()],
            ..Default::default()
        };
        assert!(!rules.should_preserve(&item("Release 1.0")));
        assert!(rules.should_preserve(&item("Release.*")));
    }

    #[test]
    fn test_id_label_and_category_dimensions() {
        let by_id = PreserveRules {
            preserve_by_id: vec!["I_1".to_string()],
            ..Default::default()
        };
        let by_label = PreserveRules {
            preserve_by_label: vec!["keep".to_string(), "bug".to_string()],
            ..Default::default()
        };
        let by_category = PreserveRules {
            preserve_by_category: vec!["Ideas".to_string()],
            ..Default::default()
        };
        let no_match = PreserveRules {
            preserve_by_id: vec!["I_2".to_string()],
            preserve_by_label: vec!["keep".to_string()],
            preserve_by_category: vec!["Q&A".to_string()],
            preserve_by_title: vec!["Other".to_string()],
        };

        let it = item("Demo");
        assert!(by_id.should_preserve(&it));
        assert!(by_label.should_preserve(&it));
        assert!(by_category.should_preserve(&it));
        assert!(!no_match.should_preserve(&it));
    }

    #[test]
    fn test_missing_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = PreserveConfig::load(&dir.path().join("preserve.json")).unwrap();
        assert!(config.is_empty());
        assert_eq!(config, PreserveConfig::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preserve.json");
        fs::write(&path, "{ not json").unwrap();

        let err = PreserveConfig::load(&path).unwrap_err();
        assert_eq!(err.layer(), Some(Layer::Config));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preserve.json");
        fs::write(&path, r#"{"issues": {"preserve_by_title": ["^(unclosed"]}}"#).unwrap();

        let err = PreserveConfig::load(&path).unwrap_err();
        assert_eq!(err.layer(), Some(Layer::Config));
        assert!(err.to_string().contains("issues"));
    }

    #[test]
    fn test_save_and_reload_keeps_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preserve.json");
        let config = PreserveConfig {
            issues: PreserveRules {
                preserve_by_title: vec!["Welcome".to_string(), "^Release.*".to_string()],
                preserve_by_label: vec!["pinned".to_string()],
                ..Default::default()
            },
            discussions: PreserveRules {
                preserve_by_category: vec!["Announcements".to_string()],
                ..Default::default()
            },
            pull_requests: PreserveRules::default(),
            labels: PreserveRules {
                preserve_by_id: vec!["bug".to_string()],
                ..Default::default()
            },
        };

        config.save(&path).unwrap();
        assert_eq!(PreserveConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_sections_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preserve.json");
        fs::write(&path, r#"{"labels": {"preserve_by_title": ["bug"]}}"#).unwrap();

        let config = PreserveConfig::load(&path).unwrap();
        assert!(config.issues.is_empty());
        assert_eq!(config.labels.preserve_by_title, vec!["bug".to_string()]);
    }
}
