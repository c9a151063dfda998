//! CLI module for gh-demo-seed
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod cleanup;
pub mod commands;
pub mod create;
pub mod list;
pub mod session;

pub use commands::{Cli, Commands};
