//! Per-invocation setup shared by all commands
//!
//! Merges CLI flags over the settings file and builds the run context and
//! GitHub client.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::commands::{GlobalArgs, KindArg};
use crate::core::repository::RepositoryContext;
use crate::core::{OperationContext, Settings};
use crate::error::Result;
use crate::github::{GitHubClient, ItemKind};
use crate::seed::KindFilter;

/// Effective options for one run
#[derive(Debug, Clone)]
pub struct Session {
    pub content_dir: PathBuf,
    /// Explicit target; `None` falls back to GH_REPO and the origin remote
    pub target: Option<RepositoryContext>,
    /// Whole-run timeout; zero disables it
    pub timeout: Duration,
}

impl Session {
    /// Load settings and apply flag overrides
    pub fn from_args(global: &GlobalArgs) -> Result<Self> {
        Self::resolve(global, Settings::load()?)
    }

    /// Apply flag overrides to already-loaded settings
    pub fn resolve(global: &GlobalArgs, settings: Settings) -> Result<Self> {
        let target = match global.repo.as_deref().or(settings.repo.as_deref()) {
            Some(value) => Some(RepositoryContext::parse(value.trim())?),
            None => None,
        };

        Ok(Self {
            content_dir: global
                .content_dir
                .clone()
                .unwrap_or(settings.content_dir),
            target,
            timeout: Duration::from_secs(global.timeout.unwrap_or(settings.timeout_secs)),
        })
    }

    /// Build the run context; Ctrl-C cancels it
    pub fn context(&self) -> OperationContext {
        let ctx = if self.timeout.is_zero() {
            OperationContext::new()
        } else {
            OperationContext::with_timeout(self.timeout)
        };

        let on_interrupt = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, stopping after the current request");
                on_interrupt.cancel();
            }
        });
        ctx
    }

    /// Create the GitHub client; this is where the token is looked up
    pub fn client(&self) -> Result<GitHubClient> {
        let (owner, repo) = match &self.target {
            Some(target) => (target.owner.clone(), target.name.clone()),
            None => (String::new(), String::new()),
        };
        GitHubClient::new(owner, repo)
    }
}

/// Convert `--only` values to a filter
pub fn kind_filter(only: Vec<KindArg>) -> KindFilter {
    KindFilter::new(only.into_iter().map(ItemKind::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let global = GlobalArgs {
            repo: Some("octo/flag".to_string()),
            content_dir: Some(PathBuf::from("demo")),
            timeout: Some(10),
            verbose: false,
        };
        let settings = Settings {
            repo: Some("octo/settings".to_string()),
            ..Default::default()
        };

        let session = Session::resolve(&global, settings).unwrap();
        assert_eq!(session.target.unwrap().full_name(), "octo/flag");
        assert_eq!(session.content_dir, PathBuf::from("demo"));
        assert_eq!(session.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_settings_fill_missing_flags() {
        let settings = Settings {
            repo: Some("https://github.com/octo/settings".to_string()),
            timeout_secs: 0,
            ..Default::default()
        };

        let session = Session::resolve(&GlobalArgs::default(), settings).unwrap();
        assert_eq!(session.target.unwrap().full_name(), "octo/settings");
        assert_eq!(session.content_dir, PathBuf::from("config"));
        assert!(session.timeout.is_zero());
    }

    #[test]
    fn test_no_target_defers_to_detection() {
        let session = Session::resolve(&GlobalArgs::default(), Settings::default()).unwrap();
        assert!(session.target.is_none());
    }

    #[test]
    fn test_bad_repo_flag_is_config_error() {
        let global = GlobalArgs {
            repo: Some("not-a-repo".to_string()),
            ..Default::default()
        };
        let err = Session::resolve(&global, Settings::default()).unwrap_err();
        assert_eq!(err.layer(), Some(crate::error::Layer::Config));
    }
}
