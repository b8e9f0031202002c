//! Shared flow plumbing
//!
//! Every interactive flow follows the same shape: Select, Collect,
//! Preview/Confirm, Execute. The pieces that mutate the repository are
//! factored into free functions over `&mut dyn Git` so integration
//! tests can drive them with a fake backend.

use anyhow::{Context, Result};
use tracing::info;

use tempo_core::{format_epoch, CommitRecord, RewritePlan};
use tempo_tui::{confirm, Session, Spinner};

use crate::git::{is_protected, Git};

/// How a flow ended. Mutation failures travel as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    /// User escaped a component; nothing was mutated, no backup exists.
    Cancelled,
    /// A precondition failed (nothing staged, nothing to rewrite, ...).
    Precondition(String),
}

impl FlowOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            FlowOutcome::Completed | FlowOutcome::Cancelled => 0,
            FlowOutcome::Precondition(_) => 1,
        }
    }
}

/// Short id for display.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

pub fn print_commit(record: &CommitRecord) {
    println!(
        "  {}  {}  {}",
        short_id(&record.id),
        format_epoch(record.time),
        record.subject
    );
}

/// Gate for pushes into the fixed protected-branch set.
///
/// Returns false when the push must not happen (declined or cancelled).
pub fn protected_branch_gate(branch: &str) -> std::io::Result<bool> {
    if !is_protected(branch) {
        return Ok(true);
    }
    let mut session = Session::new();
    let question = format!("{:?} is a protected branch. Push anyway?", branch);
    Ok(matches!(confirm(&mut session, &question, false)?, Some(true)))
}

/// Create the backup ref and run the rewrite, in that order.
///
/// On failure the backup ref name is carried in the error so the user
/// can recover manually; the ref is never removed.
pub fn execute_rewrite(git: &mut dyn Git, plan: &RewritePlan) -> Result<String> {
    let backup = git
        .create_backup_ref()
        .context("creating backup ref before rewrite")?;
    println!("Backup ref created: {}", backup);
    info!(backup = %backup, commits = plan.len(), "rewriting history");

    let mut spinner = Spinner::start("Rewriting history...");
    let result = git.rewrite_times(plan.entries());
    spinner.stop();

    result.with_context(|| {
        format!(
            "history rewrite failed; your original history is preserved at {}",
            backup
        )
    })?;
    Ok(backup)
}

/// Push, force-with-lease or plain, behind the protected-branch gate.
pub fn gated_push(
    git: &mut dyn Git,
    branch: &str,
    args: &[String],
    with_lease: bool,
) -> Result<FlowOutcome> {
    if !protected_branch_gate(branch)? {
        return Ok(FlowOutcome::Cancelled);
    }

    let mut spinner = Spinner::start("Pushing...");
    let result = if with_lease {
        git.force_push_with_lease(args)
    } else {
        git.push(args)
    };
    spinner.stop();

    result.context("push failed")?;
    println!("Pushed.");
    Ok(FlowOutcome::Completed)
}
