//! Whole-run orchestration of creators and deleters

pub mod orchestrator;

pub use orchestrator::{CleanupEntry, CleanupOutcome, ContentOrchestrator, CreateOutcome, KindFilter};
