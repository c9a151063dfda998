//! Repository context detection
//!
//! When no owner/repo is configured, operations target the "current"
//! repository: `GH_REPO` if set, otherwise the `origin` remote of the git
//! repository in the working directory.

use url::Url;

use crate::core::git::GitRepository;
use crate::error::{LayeredError, Result};

const GH_REPO_ENV: &str = "GH_REPO";

/// Repository owner and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryContext {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryContext {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Detect repository context from the environment or current directory
    pub fn detect() -> Result<Self> {
        if let Ok(value) = std::env::var(GH_REPO_ENV) {
            if !value.trim().is_empty() {
                return Self::parse(value.trim());
            }
        }

        let git_repo = GitRepository::open_current_dir()?;
        let remote_url = git_repo.origin_url()?;
        let (owner, name) = parse_github_url(&remote_url)?;
        Ok(Self { owner, name })
    }

    /// Parse `owner/name` (or a full GitHub URL)
    pub fn parse(value: &str) -> Result<Self> {
        let (owner, name) = if value.contains("github.com") {
            parse_github_url(value)?
        } else {
            parse_owner_repo_path(value)?
        };
        Ok(Self { owner, name })
    }

    /// Get the full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Supplies the current repository when none is configured
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryContextSource: Send + Sync {
    fn current(&self) -> Result<RepositoryContext>;
}

/// Reads `GH_REPO` or the local git remote on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRepositoryContext;

impl RepositoryContextSource for LocalRepositoryContext {
    fn current(&self) -> Result<RepositoryContext> {
        RepositoryContext::detect()
    }
}

fn invalid_url(url: &str) -> LayeredError {
    LayeredError::config(
        "detect repository",
        format!(
            "cannot parse GitHub repository '{}', expected owner/repo or https://github.com/owner/repo",
            url
        ),
    )
}

/// Parse a GitHub URL to extract owner and repository name
///
/// Supports both HTTPS and SSH URL formats:
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
/// - `git@github.com:owner/repo.git`
/// - `ssh://git@github.com/owner/repo.git`
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path.trim_end_matches(".git"));
    }

    if let Some(path) = url.strip_prefix("ssh://git@github.com/") {
        return parse_owner_repo_path(path.trim_end_matches(".git"));
    }

    if let Ok(parsed) = Url::parse(url) {
        if parsed.host_str() == Some("github.com") {
            let path = parsed
                .path()
                .trim_start_matches('/')
                .trim_end_matches(".git");
            return parse_owner_repo_path(path);
        }
    }

    Err(invalid_url(url).into())
}

/// Parse owner/repo from a path string
fn parse_owner_repo_path(path: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() >= 2 {
        let owner = parts[0].to_string();
        let repo = parts[1].to_string();
        if !owner.is_empty() && !repo.is_empty() {
            return Ok((owner, repo));
        }
    }
    Err(invalid_url(path).into())
}
