//! Push flow with optional history rewrite
//!
//! Enumerates commits unique to HEAD relative to upstream (oldest
//! first). With none there is nothing to rewrite and the push is plain.
//! Otherwise the user chooses: push as-is, rewrite timestamps one by
//! one, shift everything by one relative offset, or walk a cadence
//! preset. After any rewrite the push is force-with-lease, never bare
//! force, and protected branches always require an explicit confirm.

use anyhow::{Context, Result};

use tempo_core::{
    all_presets, format_epoch, parse_relative, CommitRecord, RewritePlan,
};
use tempo_tui::{confirm, single_select, text_input, timestamp_input, Session, Spinner};

use crate::flow::{execute_rewrite, gated_push, print_commit, short_id, FlowOutcome};
use crate::git::Git;

const MODES: [&str; 4] = [
    "push as-is",
    "rewrite individually",
    "batch offset",
    "apply preset",
];

fn mode_descriptions() -> Vec<String> {
    vec![
        "no rewrite, plain push".to_string(),
        "enter a new time per commit".to_string(),
        "shift all commits by one offset".to_string(),
        "generate a cadence from a preset".to_string(),
    ]
}

pub fn run_push(git: &mut dyn Git, passthrough: &[String]) -> Result<FlowOutcome> {
    let branch = git.current_branch().context("reading current branch")?;
    let commits = git.unpushed_commits().context("enumerating unpushed commits")?;

    if commits.is_empty() {
        // nothing to rewrite, no backup, plain push
        println!("No unpushed commits on {:?}; pushing.", branch);
        let mut spinner = Spinner::start("Pushing...");
        let result = git.push(passthrough);
        spinner.stop();
        result.context("push failed")?;
        println!("Pushed.");
        return Ok(FlowOutcome::Completed);
    }

    println!("{} unpushed commit(s) on {:?}:", commits.len(), branch);
    for commit in &commits {
        print_commit(commit);
    }

    let mut session = Session::with_tabs(&["mode", "times", "rewrite", "push"]);
    let options: Vec<String> = MODES.iter().map(|s| s.to_string()).collect();
    let Some(mode) = single_select(
        &mut session,
        "mode",
        "How should these be pushed?",
        &options,
        &mode_descriptions(),
        0,
    )?
    else {
        return Ok(FlowOutcome::Cancelled);
    };
    session.advance();

    if mode == 0 {
        return gated_push(git, &branch, passthrough, false);
    }

    let Some(plan) = collect_plan(&mut session, &commits, mode)? else {
        return Ok(FlowOutcome::Cancelled);
    };
    session.advance();

    println!("Planned rewrite:");
    for entry in plan.entries() {
        println!(
            "  {}  {} -> {}",
            short_id(&entry.commit.id),
            format_epoch(entry.commit.time),
            format_epoch(entry.new_time)
        );
    }
    if !matches!(
        confirm(
            &mut session,
            &format!("Rewrite {} commit(s)?", plan.len()),
            true
        )?,
        Some(true)
    ) {
        return Ok(FlowOutcome::Cancelled);
    }

    execute_rewrite(git, &plan)?;
    println!("History rewritten.");
    session.advance();

    match confirm(&mut session, "Push now (force-with-lease)?", true)? {
        Some(true) => gated_push(git, &branch, passthrough, true),
        Some(false) | None => {
            println!("Not pushing; run `git push --force-with-lease` when ready.");
            Ok(FlowOutcome::Completed)
        }
    }
}

/// Collect a rewrite plan for the chosen mode; `None` means cancelled.
fn collect_plan(
    session: &mut Session,
    commits: &[CommitRecord],
    mode: usize,
) -> Result<Option<RewritePlan>> {
    match mode {
        1 => {
            // oldest to newest, each guarded against the previous new value
            let mut plan = RewritePlan::new();
            for commit in commits {
                println!(
                    "{}  currently {}  {}",
                    short_id(&commit.id),
                    format_epoch(commit.time),
                    commit.subject
                );
                let Some(entered) = timestamp_input(
                    session,
                    &format!("time:{}", short_id(&commit.id)),
                    "New time",
                    commit.time,
                )?
                else {
                    return Ok(None);
                };
                let planned = plan.append(commit.clone(), entered);
                if planned != entered {
                    println!(
                        "  adjusted to {} to keep chronological order",
                        format_epoch(planned)
                    );
                }
            }
            Ok(Some(plan))
        }
        2 => {
            let is_offset = |text: &str| {
                parse_relative(text)
                    .map(|_| ())
                    .map_err(|_| "expected a relative offset like -2h or +1d30m".to_string())
            };
            let Some(offset) = text_input(
                session,
                "offset",
                "Offset for all commits",
                "",
                Some(&is_offset),
            )?
            else {
                return Ok(None);
            };
            // validator guarantees this parses
            let delta = parse_relative(&offset).unwrap_or(0);
            Ok(Some(RewritePlan::offset(commits, delta)))
        }
        3 => {
            let presets = all_presets();
            let names: Vec<String> = presets.iter().map(|p| p.name.clone()).collect();
            let descriptions: Vec<String> =
                presets.iter().map(|p| p.description.clone()).collect();
            let Some(chosen) =
                single_select(session, "preset", "Cadence preset", &names, &descriptions, 0)?
            else {
                return Ok(None);
            };
            let Some(anchor) = timestamp_input(
                session,
                "anchor",
                "Anchor time for the oldest commit",
                commits[0].time,
            )?
            else {
                return Ok(None);
            };
            Ok(Some(RewritePlan::from_preset(
                commits,
                &presets[chosen],
                anchor,
            )))
        }
        _ => Ok(None),
    }
}
