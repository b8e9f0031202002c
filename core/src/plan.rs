//! Commit records and rewrite plans
//!
//! A [`RewritePlan`] pairs a read-only snapshot of commits (oldest
//! first) with their new timestamps. Interactively appended entries are
//! guarded against the immediately preceding new value only, never
//! transitively. Uniform offsets preserve the original spacing
//! verbatim.

use serde::{Deserialize, Serialize};

use crate::preset::{apply_preset, CadencePreset};
use crate::sequence::{ensure_after, MIN_GAP_SECS};

/// Read-only snapshot of one commit taken at flow start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Stable commit identifier
    pub id: String,
    /// First line of the commit message
    pub subject: String,
    /// Original author time, epoch seconds
    pub time: i64,
}

/// One planned rewrite: a commit and its new timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub commit: CommitRecord,
    pub new_time: i64,
}

/// Ordered mapping of commits to new timestamps.
#[derive(Debug, Clone, Default)]
pub struct RewritePlan {
    entries: Vec<PlanEntry>,
    min_gap: i64,
}

impl RewritePlan {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            min_gap: MIN_GAP_SECS,
        }
    }

    pub fn with_min_gap(min_gap: i64) -> Self {
        Self {
            entries: Vec::new(),
            min_gap,
        }
    }

    /// Append a commit with a proposed new time.
    ///
    /// The proposal is pushed past the previous entry's new time via
    /// [`ensure_after`] when it would crowd or precede it. Returns the
    /// time actually planned.
    pub fn append(&mut self, commit: CommitRecord, proposed: i64) -> i64 {
        let adjusted = match self.entries.last() {
            Some(prev) => ensure_after(proposed, prev.new_time, self.min_gap),
            None => proposed,
        };
        self.entries.push(PlanEntry {
            commit,
            new_time: adjusted,
        });
        adjusted
    }

    /// Shift every commit by a uniform delta, preserving original gaps.
    pub fn offset(commits: &[CommitRecord], delta: i64) -> Self {
        let mut plan = Self::new();
        plan.entries = commits
            .iter()
            .map(|commit| PlanEntry {
                commit: commit.clone(),
                new_time: commit.time + delta,
            })
            .collect();
        plan
    }

    /// Anchor the oldest commit and walk the rest through a preset.
    pub fn from_preset(commits: &[CommitRecord], preset: &CadencePreset, anchor: i64) -> Self {
        let mut plan = Self::new();
        let mut iter = commits.iter();
        if let Some(first) = iter.next() {
            plan.entries.push(PlanEntry {
                commit: first.clone(),
                new_time: anchor,
            });
        }
        for commit in iter {
            // last() is always present here; the anchor entry seeds it
            let prev = plan.entries.last().map(|e| e.new_time).unwrap_or(anchor);
            let proposed = apply_preset(preset, prev);
            plan.append(commit.clone(), proposed);
        }
        plan
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any commit actually changes time.
    pub fn changes_anything(&self) -> bool {
        self.entries.iter().any(|e| e.new_time != e.commit.time)
    }
}
