//! CLI command definitions using clap
//!
//! Defines the command structure for the `gh-demo-seed` CLI tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::github::ItemKind;

/// gh-demo-seed - Populate and reset GitHub demo repositories
///
/// Reads issues, discussions, pull requests and labels from JSON files and
/// creates them in a repository, or removes everything not preserved.
#[derive(Parser, Debug)]
#[command(name = "gh-demo-seed", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Target repository as owner/name or a GitHub URL
    /// (defaults to settings, then GH_REPO, then the origin remote)
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Directory holding the content JSON files
    #[arg(long, global = true)]
    pub content_dir: Option<PathBuf>,

    /// Abort the run after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create all demo content in the repository
    Create {
        /// Only create these kinds (repeatable)
        #[arg(long, value_enum)]
        only: Vec<KindArg>,
    },

    /// Delete demo content, keeping items matched by preserve rules
    Cleanup {
        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Preserve rules file (defaults to preserve.json in the content directory)
        #[arg(long)]
        preserve: Option<PathBuf>,

        /// Only clean up these kinds (repeatable)
        #[arg(long, value_enum)]
        only: Vec<KindArg>,
    },

    /// List existing content with node IDs
    List {
        /// Only list these kinds (repeatable)
        #[arg(long, value_enum)]
        only: Vec<KindArg>,
    },
}

/// Content kinds accepted by `--only`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Issue,
    Discussion,
    PullRequest,
    Label,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Issue => ItemKind::Issue,
            KindArg::Discussion => ItemKind::Discussion,
            KindArg::PullRequest => ItemKind::PullRequest,
            KindArg::Label => ItemKind::Label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cleanup_flags() {
        let cli = Cli::parse_from([
            "gh-demo-seed",
            "--repo",
            "octo/demo",
            "cleanup",
            "--dry-run",
            "--only",
            "issue",
            "--only",
            "pull-request",
        ]);

        assert_eq!(cli.global.repo.as_deref(), Some("octo/demo"));
        match cli.command {
            Commands::Cleanup { dry_run, only, preserve } => {
                assert!(dry_run);
                assert!(preserve.is_none());
                assert_eq!(only, vec![KindArg::Issue, KindArg::PullRequest]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["gh-demo-seed", "create", "--timeout", "30", "-v"]);
        assert_eq!(cli.global.timeout, Some(30));
        assert!(cli.global.verbose);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["gh-demo-seed", "list", "--only", "project"]).is_err());
    }
}
