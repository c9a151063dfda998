//! Core functionality for gh-demo-seed
//!
//! This module contains the pieces that do not talk to GitHub:
//! - Cancellation and deadlines
//! - Error aggregation for batch runs
//! - Preserve rules for cleanup
//! - Demo content files
//! - Repository target detection
//! - Token lookup
//! - Application settings

pub mod aggregate;
pub mod content;
pub mod context;
pub mod git;
pub mod preserve;
pub mod repository;
pub mod settings;
pub mod token_manager;

pub use aggregate::ErrorAggregator;
pub use content::SeedContent;
pub use context::OperationContext;
pub use git::GitRepository;
pub use preserve::{PreserveCandidate, PreserveConfig, PreserveRules};
pub use repository::RepositoryContext;
pub use settings::Settings;
pub use token_manager::TokenManager;
