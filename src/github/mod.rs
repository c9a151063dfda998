//! GitHub API integration module
//!
//! This module provides all GitHub-related functionality:
//! - GraphQL and REST transports
//! - Node ID lookups
//! - Issue, discussion, pull request and label operations
//! - Best-effort label and assignee attachment
//! - Error classification

pub mod attach;
pub mod client;
pub mod discussion;
pub mod error_handler;
pub mod issue;
pub mod item;
pub mod label;
pub mod pagination;
pub mod pull_request;
pub mod resolver;
pub mod transport;

pub use client::GitHubClient;
pub use discussion::{Discussion, DiscussionHandler};
pub use error_handler::classify_github_error;
pub use issue::{Issue, IssueHandler};
pub use item::{CreatedItemInfo, ItemKind};
pub use label::{Label, LabelHandler};
pub use pull_request::{PullRequest, PullRequestHandler};
pub use resolver::{DiscussionCategory, IdentifierResolver};
pub use transport::{GraphqlTransport, OctocrabTransport, RestMethod, RestTransport};
