//! Git backend
//!
//! Every mutation the flows perform goes through the [`Git`] trait so
//! the orchestrator stays testable against a fake backend. [`GitCli`]
//! shells out to the `git` binary; [`DryRun`] wraps any backend,
//! answers queries through, and prints mutations instead of running
//! them.

use std::process::{Command, Stdio};

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use tempo_core::{CommitRecord, PlanEntry};

/// Branch names that always require explicit confirmation before a
/// history-altering push.
pub const PROTECTED_BRANCHES: [&str; 5] = ["main", "master", "develop", "production", "staging"];

pub fn is_protected(branch: &str) -> bool {
    PROTECTED_BRANCHES.contains(&branch)
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("unexpected git output: {0:?}")]
    UnexpectedOutput(String),
}

pub type Result<T> = std::result::Result<T, GitError>;

/// The version-control operations the flows need.
pub trait Git {
    fn current_branch(&self) -> Result<String>;
    fn head_commit(&self) -> Result<CommitRecord>;
    /// Commits unique to HEAD relative to upstream, oldest first.
    fn unpushed_commits(&self) -> Result<Vec<CommitRecord>>;
    fn has_staged_changes(&self) -> Result<bool>;
    fn stage_all(&mut self) -> Result<()>;
    /// Create a named backup ref at HEAD; returns the ref name.
    fn create_backup_ref(&mut self) -> Result<String>;
    /// Amend only HEAD's author and committer time.
    fn amend_head_time(&mut self, epoch: i64) -> Result<()>;
    /// Plain commit with assembled arguments; a time overrides both
    /// author and committer date for this one commit.
    fn commit(&mut self, args: &[String], time: Option<i64>) -> Result<()>;
    /// One range rewrite overriding author/committer time per entry,
    /// leaving all other commit data untouched.
    fn rewrite_times(&mut self, entries: &[PlanEntry]) -> Result<()>;
    fn push(&mut self, args: &[String]) -> Result<()>;
    fn force_push_with_lease(&mut self, args: &[String]) -> Result<()>;
}

/// Git's raw date format with an explicit offset.
fn git_date(epoch: i64) -> String {
    format!("@{} +0000", epoch)
}

/// Parse one `%H|%s|%at` line. The subject may itself contain pipes,
/// so the id is everything before the first separator and the epoch
/// everything after the last.
fn parse_commit_line(line: &str) -> Result<CommitRecord> {
    let (id, rest) = line
        .split_once('|')
        .ok_or_else(|| GitError::UnexpectedOutput(line.to_string()))?;
    let (subject, time) = rest
        .rsplit_once('|')
        .ok_or_else(|| GitError::UnexpectedOutput(line.to_string()))?;
    let time: i64 = time
        .parse()
        .map_err(|_| GitError::UnexpectedOutput(line.to_string()))?;
    if id.is_empty() {
        return Err(GitError::UnexpectedOutput(line.to_string()));
    }
    Ok(CommitRecord {
        id: id.to_string(),
        subject: subject.to_string(),
        time,
    })
}

/// Build the env-filter script for a bulk timestamp rewrite.
fn env_filter_script(entries: &[PlanEntry]) -> String {
    let mut script = String::from("case \"$GIT_COMMIT\" in\n");
    for entry in entries {
        script.push_str(&format!(
            "{})\n    export GIT_AUTHOR_DATE=\"{date}\"\n    export GIT_COMMITTER_DATE=\"{date}\"\n    ;;\n",
            entry.commit.id,
            date = git_date(entry.new_time),
        ));
    }
    script.push_str("esac\n");
    script
}

/// Backend that shells out to the `git` binary.
#[derive(Debug, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, args: &[&str], envs: &[(&str, String)]) -> Result<String> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn has_upstream(&self) -> bool {
        self.run(
            &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"],
            &[],
        )
        .is_ok()
    }

    fn has_parent(&self, id: &str) -> bool {
        let spec = format!("{}^", id);
        self.run(&["rev-parse", "--verify", "--quiet", &spec], &[])
            .is_ok()
    }
}

impl Git for GitCli {
    fn current_branch(&self) -> Result<String> {
        self.run(&["branch", "--show-current"], &[])
    }

    fn head_commit(&self) -> Result<CommitRecord> {
        let line = self.run(&["log", "-1", "--format=%H|%s|%at"], &[])?;
        parse_commit_line(&line)
    }

    fn unpushed_commits(&self) -> Result<Vec<CommitRecord>> {
        if !self.has_upstream() {
            debug!("no upstream configured, treating as nothing to compare");
            return Ok(Vec::new());
        }
        let out = self.run(
            &["log", "--reverse", "--format=%H|%s|%at", "@{upstream}..HEAD"],
            &[],
        )?;
        out.lines()
            .filter(|line| !line.is_empty())
            .map(parse_commit_line)
            .collect()
    }

    fn has_staged_changes(&self) -> Result<bool> {
        // exit status 1 means the index differs from HEAD
        let status = Command::new("git")
            .args(["diff", "--cached", "--quiet"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(!status.success())
    }

    fn stage_all(&mut self) -> Result<()> {
        self.run(&["add", "-A"], &[]).map(|_| ())
    }

    fn create_backup_ref(&mut self) -> Result<String> {
        let name = format!("tempo/backup-{}", Utc::now().format("%Y%m%d-%H%M%S"));
        let full = format!("refs/{}", name);
        self.run(&["update-ref", &full, "HEAD"], &[])?;
        Ok(name)
    }

    fn amend_head_time(&mut self, epoch: i64) -> Result<()> {
        let date = git_date(epoch);
        self.run(
            &["commit", "--amend", "--no-edit", "--date", &date],
            &[("GIT_COMMITTER_DATE", date.clone())],
        )
        .map(|_| ())
    }

    fn commit(&mut self, args: &[String], time: Option<i64>) -> Result<()> {
        let mut full: Vec<&str> = vec!["commit"];
        let date = time.map(git_date);
        if let Some(date) = &date {
            full.push("--date");
            full.push(date);
        }
        full.extend(args.iter().map(String::as_str));

        let mut envs = Vec::new();
        if let Some(date) = &date {
            envs.push(("GIT_COMMITTER_DATE", date.clone()));
        }
        self.run(&full, &envs).map(|_| ())
    }

    fn rewrite_times(&mut self, entries: &[PlanEntry]) -> Result<()> {
        let Some(first) = entries.first() else {
            return Ok(());
        };
        let script = env_filter_script(entries);
        let range = if self.has_parent(&first.commit.id) {
            format!("{}^..HEAD", first.commit.id)
        } else {
            // oldest planned commit is the root; rewrite the whole line
            "HEAD".to_string()
        };
        self.run(
            &["filter-branch", "-f", "--env-filter", &script, "--", &range],
            &[("FILTER_BRANCH_SQUELCH_WARNING", "1".to_string())],
        )
        .map(|_| ())
    }

    fn push(&mut self, args: &[String]) -> Result<()> {
        let mut full: Vec<&str> = vec!["push"];
        full.extend(args.iter().map(String::as_str));
        self.run(&full, &[]).map(|_| ())
    }

    fn force_push_with_lease(&mut self, args: &[String]) -> Result<()> {
        // never a bare force
        let mut full: Vec<&str> = vec!["push", "--force-with-lease"];
        full.extend(args.iter().map(String::as_str));
        self.run(&full, &[]).map(|_| ())
    }
}

/// Wrapper that suppresses every mutating call and prints it instead.
pub struct DryRun<G: Git> {
    inner: G,
}

impl<G: Git> DryRun<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    fn announce(&self, action: &str) {
        println!("[dry-run] {}", action);
    }
}

impl<G: Git> Git for DryRun<G> {
    fn current_branch(&self) -> Result<String> {
        self.inner.current_branch()
    }

    fn head_commit(&self) -> Result<CommitRecord> {
        self.inner.head_commit()
    }

    fn unpushed_commits(&self) -> Result<Vec<CommitRecord>> {
        self.inner.unpushed_commits()
    }

    fn has_staged_changes(&self) -> Result<bool> {
        self.inner.has_staged_changes()
    }

    fn stage_all(&mut self) -> Result<()> {
        self.announce("git add -A");
        Ok(())
    }

    fn create_backup_ref(&mut self) -> Result<String> {
        self.announce("git update-ref refs/tempo/backup-<timestamp> HEAD");
        Ok("tempo/backup-dry-run".to_string())
    }

    fn amend_head_time(&mut self, epoch: i64) -> Result<()> {
        self.announce(&format!(
            "git commit --amend --no-edit --date {:?}",
            git_date(epoch)
        ));
        Ok(())
    }

    fn commit(&mut self, args: &[String], time: Option<i64>) -> Result<()> {
        let mut rendered = String::from("git commit");
        if let Some(epoch) = time {
            rendered.push_str(&format!(" --date {:?}", git_date(epoch)));
        }
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        self.announce(&rendered);
        Ok(())
    }

    fn rewrite_times(&mut self, entries: &[PlanEntry]) -> Result<()> {
        self.announce(&format!(
            "git filter-branch --env-filter <{} commit(s)> over {}..HEAD",
            entries.len(),
            entries
                .first()
                .map(|e| &e.commit.id[..e.commit.id.len().min(8)])
                .unwrap_or("HEAD"),
        ));
        for entry in entries {
            self.announce(&format!(
                "  {} -> @{}",
                &entry.commit.id[..entry.commit.id.len().min(8)],
                entry.new_time
            ));
        }
        Ok(())
    }

    fn push(&mut self, args: &[String]) -> Result<()> {
        self.announce(&format!("git push {}", args.join(" ")));
        Ok(())
    }

    fn force_push_with_lease(&mut self, args: &[String]) -> Result<()> {
        self.announce(&format!("git push --force-with-lease {}", args.join(" ")));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_branch_set() {
        for name in ["main", "master", "develop", "production", "staging"] {
            assert!(is_protected(name), "{} should be protected", name);
        }
        assert!(!is_protected("feature/parser"));
        assert!(!is_protected("Main")); // exact names only
    }

    #[test]
    fn test_parse_commit_line() {
        let rec = parse_commit_line("abc123|fix the parser|1700000000").unwrap();
        assert_eq!(rec.id, "abc123");
        assert_eq!(rec.subject, "fix the parser");
        assert_eq!(rec.time, 1_700_000_000);
    }

    #[test]
    fn test_parse_commit_line_subject_may_contain_pipes() {
        let rec = parse_commit_line("abc|feat: a | b | c|99").unwrap();
        assert_eq!(rec.id, "abc");
        assert_eq!(rec.subject, "feat: a | b | c");
        assert_eq!(rec.time, 99);
    }

    #[test]
    fn test_parse_commit_line_rejects_malformed() {
        assert!(parse_commit_line("").is_err());
        assert!(parse_commit_line("abc|no time").is_err());
        assert!(parse_commit_line("abc|subject|not-a-number").is_err());
    }

    #[test]
    fn test_env_filter_script_covers_every_entry() {
        let entries = vec![
            PlanEntry {
                commit: CommitRecord {
                    id: "aaa".to_string(),
                    subject: "one".to_string(),
                    time: 1000,
                },
                new_time: 2000,
            },
            PlanEntry {
                commit: CommitRecord {
                    id: "bbb".to_string(),
                    subject: "two".to_string(),
                    time: 1100,
                },
                new_time: 2100,
            },
        ];
        let script = env_filter_script(&entries);
        assert!(script.starts_with("case \"$GIT_COMMIT\" in"));
        assert!(script.contains("aaa)"));
        assert!(script.contains("GIT_AUTHOR_DATE=\"@2000 +0000\""));
        assert!(script.contains("GIT_COMMITTER_DATE=\"@2100 +0000\""));
        assert!(script.trim_end().ends_with("esac"));
    }

    #[test]
    fn test_git_date_format() {
        assert_eq!(git_date(1_700_000_000), "@1700000000 +0000");
    }
}
