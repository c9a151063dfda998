//! gh-demo-seed - Populate and reset GitHub demo repositories
//!
//! This library seeds a repository with issues, discussions, pull requests
//! and labels described in JSON files, and removes them again while keeping
//! anything matched by preserve rules.

pub mod cli;
pub mod core;
pub mod error;
pub mod github;
pub mod seed;

pub use error::{Result, SeedError};
