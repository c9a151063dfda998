//! GitHub token discovery
//!
//! Authentication is owned by the GitHub CLI; this module only finds the
//! token it already has.
//!
//! ## Token Priority
//!
//! 1. `GH_TOKEN` environment variable
//! 2. `GITHUB_TOKEN` environment variable
//! 3. `gh auth token` output

use std::process::Command;

use secrecy::SecretString;

use crate::error::{LayeredError, Result};

const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Locates the token used for GitHub API calls
pub struct TokenManager;

impl TokenManager {
    /// Get a GitHub token from the environment or the `gh` CLI
    pub fn get_valid_token() -> Result<SecretString> {
        if let Some(token) = Self::token_from_env() {
            return Ok(token);
        }

        let output = Command::new("gh").args(["auth", "token"]).output().map_err(|e| {
            LayeredError::config(
                "authenticate",
                "no GH_TOKEN/GITHUB_TOKEN set and the gh CLI could not be run; run 'gh auth login'",
            )
            .with_cause(e)
        })?;

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || token.is_empty() {
            return Err(LayeredError::config(
                "authenticate",
                "you are not logged in to GitHub; run 'gh auth login'",
            )
            .into());
        }

        tracing::debug!("using token from gh CLI");
        Ok(SecretString::from(token))
    }

    /// Token from `GH_TOKEN` or `GITHUB_TOKEN`, whichever is set first
    pub fn token_from_env() -> Option<SecretString> {
        TOKEN_ENV_VARS.iter().find_map(|name| {
            std::env::var(name)
                .ok()
                .filter(|token| !token.trim().is_empty())
                .map(|token| {
                    tracing::debug!(source = name, "using token from environment");
                    SecretString::from(token.trim().to_string())
                })
        })
    }
}
