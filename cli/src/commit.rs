//! Amend and commit flows

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use tempo_core::format_epoch;
use tempo_tui::{confirm, multi_select, single_select, text_input, timestamp_input, Session};

use crate::flow::{short_id, FlowOutcome};
use crate::git::Git;

/// Amend HEAD's timestamp only, preserving message and content.
pub fn run_amend(git: &mut dyn Git) -> Result<FlowOutcome> {
    let head = git.head_commit().context("reading HEAD")?;
    println!(
        "HEAD {}  {}  {}",
        short_id(&head.id),
        format_epoch(head.time),
        head.subject
    );

    let mut session = Session::with_tabs(&["timestamp", "apply"]);
    let Some(new_time) = timestamp_input(&mut session, "timestamp", "New timestamp", head.time)?
    else {
        return Ok(FlowOutcome::Cancelled);
    };
    session.advance();

    if new_time == head.time {
        println!("Timestamp unchanged, nothing to do.");
        return Ok(FlowOutcome::Completed);
    }

    println!("  {} -> {}", format_epoch(head.time), format_epoch(new_time));
    if !matches!(
        confirm(&mut session, "Amend HEAD's timestamp?", true)?,
        Some(true)
    ) {
        return Ok(FlowOutcome::Cancelled);
    }

    // backup immediately before the rewrite, never earlier
    let backup = git
        .create_backup_ref()
        .context("creating backup ref before amend")?;
    println!("Backup ref created: {}", backup);

    git.amend_head_time(new_time).map_err(|e| {
        anyhow::anyhow!(e).context(format!(
            "amend failed; your original commit is preserved at {}",
            backup
        ))
    })?;

    println!("Amended HEAD to {}.", format_epoch(new_time));
    Ok(FlowOutcome::Completed)
}

const FIELDS: [&str; 4] = ["message", "timestamp", "author", "signing"];

fn field_descriptions() -> Vec<String> {
    vec![
        "commit message".to_string(),
        "author and committer time".to_string(),
        "author as Name <email>".to_string(),
        "GPG signing".to_string(),
    ]
}

/// Interactive commit: pick fields to customize, collect them, commit.
pub fn run_commit(git: &mut dyn Git, passthrough: &[String]) -> Result<FlowOutcome> {
    if !git.has_staged_changes().context("checking the index")? {
        let mut session = Session::new();
        match confirm(&mut session, "Nothing staged. Stage all changes?", false)? {
            Some(true) => git.stage_all().context("staging all changes")?,
            Some(false) => {
                return Ok(FlowOutcome::Precondition(
                    "nothing staged; stage changes and retry".to_string(),
                ))
            }
            None => return Ok(FlowOutcome::Cancelled),
        }
    }

    let mut session = Session::with_tabs(&["fields", "details", "commit"]);
    let options: Vec<String> = FIELDS.iter().map(|s| s.to_string()).collect();
    let Some(picked) = multi_select(
        &mut session,
        "fields",
        "Customize which fields?",
        &options,
        &field_descriptions(),
        &[],
    )?
    else {
        return Ok(FlowOutcome::Cancelled);
    };
    session.advance();

    let mut args: Vec<String> = Vec::new();
    let mut time: Option<i64> = None;

    if picked.contains(&0) {
        let non_empty = |text: &str| {
            if text.trim().is_empty() {
                Err("message cannot be empty".to_string())
            } else {
                Ok(())
            }
        };
        let Some(message) =
            text_input(&mut session, "message", "Commit message", "", Some(&non_empty))?
        else {
            return Ok(FlowOutcome::Cancelled);
        };
        args.push("-m".to_string());
        args.push(message);
    }

    if picked.contains(&1) {
        let Some(epoch) = timestamp_input(
            &mut session,
            "timestamp",
            "Commit timestamp",
            Utc::now().timestamp(),
        )?
        else {
            return Ok(FlowOutcome::Cancelled);
        };
        time = Some(epoch);
    }

    if picked.contains(&2) {
        let looks_like_author = |text: &str| {
            if text.contains('<') && text.ends_with('>') {
                Ok(())
            } else {
                Err("expected Name <email>".to_string())
            }
        };
        let Some(author) = text_input(
            &mut session,
            "author",
            "Author (Name <email>)",
            "",
            Some(&looks_like_author),
        )?
        else {
            return Ok(FlowOutcome::Cancelled);
        };
        args.push("--author".to_string());
        args.push(author);
    }

    if picked.contains(&3) {
        let signing = vec!["sign (-S)".to_string(), "do not sign".to_string()];
        let Some(choice) = single_select(
            &mut session,
            "signing",
            "GPG signing",
            &signing,
            &[],
            0,
        )?
        else {
            return Ok(FlowOutcome::Cancelled);
        };
        args.push(if choice == 0 { "-S" } else { "--no-gpg-sign" }.to_string());
    }

    args.extend(passthrough.iter().cloned());
    session.advance();

    let mut rendered = String::from("git commit");
    if let Some(epoch) = time {
        rendered.push_str(&format!(" (dated {})", format_epoch(epoch)));
    }
    for arg in &args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    println!("{}", rendered);
    if !matches!(confirm(&mut session, "Run this commit?", true)?, Some(true)) {
        return Ok(FlowOutcome::Cancelled);
    }

    debug!(?args, ?time, "running commit");
    git.commit(&args, time).context("commit failed")?;
    println!("Committed.");
    Ok(FlowOutcome::Completed)
}
