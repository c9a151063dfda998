//! GitHub API client wrapper
//!
//! Bundles the two transports with the target repository. Handlers borrow a
//! `GitHubClient` the same way for every entity kind.

use std::sync::Arc;

use octocrab::Octocrab;
use secrecy::ExposeSecret;

use crate::core::repository::{LocalRepositoryContext, RepositoryContextSource};
use crate::core::TokenManager;
use crate::error::{LayeredError, Result};
use crate::github::transport::{GraphqlTransport, OctocrabTransport, RestTransport};

/// GitHub API client wrapper
pub struct GitHubClient {
    graphql: Arc<dyn GraphqlTransport>,
    rest: Arc<dyn RestTransport>,
    context: Arc<dyn RepositoryContextSource>,
    /// Repository owner; empty means "current repository"
    pub owner: String,
    /// Repository name; empty means "current repository"
    pub repo: String,
}

impl GitHubClient {
    /// Create a client backed by octocrab for the given repository
    ///
    /// The token comes from `TokenManager`. Empty `owner`/`repo` resolve to
    /// the current repository on first use.
    pub fn new(owner: String, repo: String) -> Result<Self> {
        let token = TokenManager::get_valid_token()?;

        let octocrab = Octocrab::builder()
            .personal_token(token.expose_secret().to_string())
            .build()
            .map_err(|e| {
                LayeredError::config("build GitHub client", "cannot initialise HTTP client")
                    .with_cause(e)
            })?;

        let transport = Arc::new(OctocrabTransport::new(octocrab));
        Ok(Self::with_transports(
            transport.clone(),
            transport,
            Arc::new(LocalRepositoryContext),
            owner,
            repo,
        ))
    }

    /// Create a client from explicit collaborators
    pub fn with_transports(
        graphql: Arc<dyn GraphqlTransport>,
        rest: Arc<dyn RestTransport>,
        context: Arc<dyn RepositoryContextSource>,
        owner: String,
        repo: String,
    ) -> Self {
        Self {
            graphql,
            rest,
            context,
            owner,
            repo,
        }
    }

    pub fn graphql(&self) -> &dyn GraphqlTransport {
        self.graphql.as_ref()
    }

    pub fn rest(&self) -> &dyn RestTransport {
        self.rest.as_ref()
    }

    /// Apply the current-repository fallback to `owner`/`repo`
    ///
    /// If either is empty, both come from the repository context source.
    pub fn resolve_target(&self, owner: &str, repo: &str) -> Result<(String, String)> {
        if !owner.is_empty() && !repo.is_empty() {
            return Ok((owner.to_string(), repo.to_string()));
        }

        let current = self.context.current()?;
        tracing::debug!(repo = %current.full_name(), "using current repository");
        Ok((current.owner, current.name))
    }

    /// Owner and name of the repository this client targets
    pub fn target(&self) -> Result<(String, String)> {
        self.resolve_target(&self.owner, &self.repo)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use crate::core::repository::RepositoryContext;
    use crate::github::transport::{MockGraphqlTransport, MockRestTransport};

    #[test]
    fn test_explicit_target_skips_context() {
        let client = client(MockGraphqlTransport::new(), MockRestTransport::new());
        assert_eq!(
            client.target().unwrap(),
            ("octo".to_string(), "demo".to_string())
        );
    }

    #[test]
    fn test_empty_target_uses_current_repository() {
        let client = client_for_current_repo(
            MockGraphqlTransport::new(),
            MockRestTransport::new(),
            RepositoryContext::new("me", "playground"),
        );
        assert_eq!(
            client.target().unwrap(),
            ("me".to_string(), "playground".to_string())
        );
        assert_eq!(
            client.resolve_target("other", "").unwrap(),
            ("me".to_string(), "playground".to_string())
        );
    }
}
