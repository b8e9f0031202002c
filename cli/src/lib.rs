//! Tempo CLI - Interactive rewrite orchestrator
//!
//! This crate provides:
//! - The git backend trait with shell-out and dry-run implementations
//! - The amend, commit, and push flows
//! - Backup refs and the protected-branch gate
//!
//! The binary in `main.rs` is a thin clap wrapper over these modules.

pub mod commit;
pub mod flow;
pub mod git;
pub mod push;

pub use flow::{execute_rewrite, gated_push, FlowOutcome};
pub use git::{is_protected, DryRun, Git, GitCli, GitError, PROTECTED_BRANCHES};
