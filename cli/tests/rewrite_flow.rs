//! Integration tests for the rewrite/push machinery
//!
//! These drive the non-interactive execution layer against a scripted
//! fake backend: backup-before-rewrite ordering, failure handling that
//! preserves the backup, plain pushes that create no backup, and the
//! dry-run wrapper suppressing every mutation.

use tempo_cli::git::{Git, GitError};
use tempo_cli::{execute_rewrite, DryRun, FlowOutcome};
use tempo_core::{CommitRecord, PlanEntry, RewritePlan};

#[derive(Default)]
struct FakeGit {
    branch: String,
    head: Option<CommitRecord>,
    unpushed: Vec<CommitRecord>,
    staged: bool,
    fail_rewrite: bool,
    /// Ordered log of mutations
    ops: Vec<String>,
    backups: Vec<String>,
    rewrites: Vec<Vec<(String, i64)>>,
}

impl FakeGit {
    fn with_branch(branch: &str) -> Self {
        Self {
            branch: branch.to_string(),
            ..Self::default()
        }
    }
}

impl Git for FakeGit {
    fn current_branch(&self) -> Result<String, GitError> {
        Ok(self.branch.clone())
    }

    fn head_commit(&self) -> Result<CommitRecord, GitError> {
        self.head
            .clone()
            .ok_or_else(|| GitError::UnexpectedOutput("no head".to_string()))
    }

    fn unpushed_commits(&self) -> Result<Vec<CommitRecord>, GitError> {
        Ok(self.unpushed.clone())
    }

    fn has_staged_changes(&self) -> Result<bool, GitError> {
        Ok(self.staged)
    }

    fn stage_all(&mut self) -> Result<(), GitError> {
        self.ops.push("stage_all".to_string());
        Ok(())
    }

    fn create_backup_ref(&mut self) -> Result<String, GitError> {
        let name = format!("tempo/backup-{}", self.backups.len() + 1);
        self.ops.push(format!("backup:{}", name));
        self.backups.push(name.clone());
        Ok(name)
    }

    fn amend_head_time(&mut self, epoch: i64) -> Result<(), GitError> {
        self.ops.push(format!("amend:{}", epoch));
        Ok(())
    }

    fn commit(&mut self, args: &[String], time: Option<i64>) -> Result<(), GitError> {
        self.ops.push(format!("commit:{:?}:{:?}", args, time));
        Ok(())
    }

    fn rewrite_times(&mut self, entries: &[PlanEntry]) -> Result<(), GitError> {
        if self.fail_rewrite {
            return Err(GitError::CommandFailed {
                command: "filter-branch".to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        self.ops.push("rewrite".to_string());
        self.rewrites.push(
            entries
                .iter()
                .map(|e| (e.commit.id.clone(), e.new_time))
                .collect(),
        );
        Ok(())
    }

    fn push(&mut self, args: &[String]) -> Result<(), GitError> {
        self.ops.push(format!("push:{:?}", args));
        Ok(())
    }

    fn force_push_with_lease(&mut self, args: &[String]) -> Result<(), GitError> {
        self.ops.push(format!("force_push_with_lease:{:?}", args));
        Ok(())
    }
}

fn commits(times: &[i64]) -> Vec<CommitRecord> {
    times
        .iter()
        .enumerate()
        .map(|(i, &time)| CommitRecord {
            id: format!("{:040x}", i + 1),
            subject: format!("commit {}", i + 1),
            time,
        })
        .collect()
}

#[test]
fn backup_ref_is_created_immediately_before_rewrite() {
    let mut git = FakeGit::with_branch("feature/time");
    let plan = RewritePlan::offset(&commits(&[1000, 2000]), 3600);

    let backup = execute_rewrite(&mut git, &plan).expect("rewrite succeeds");

    assert_eq!(git.ops.len(), 2);
    assert_eq!(git.ops[0], format!("backup:{}", backup));
    assert_eq!(git.ops[1], "rewrite");
}

#[test]
fn failed_rewrite_preserves_backup_and_names_it() {
    let mut git = FakeGit::with_branch("feature/time");
    git.fail_rewrite = true;
    let plan = RewritePlan::offset(&commits(&[1000]), 3600);

    let err = execute_rewrite(&mut git, &plan).expect_err("rewrite fails");

    // the backup was created before the failing mutation and survives it
    assert_eq!(git.backups.len(), 1);
    let rendered = format!("{:#}", err);
    assert!(
        rendered.contains(&git.backups[0]),
        "error should surface the backup ref: {}",
        rendered
    );
}

#[test]
fn batch_offset_rewrite_shifts_uniformly() {
    let mut git = FakeGit::with_branch("feature/time");
    let records = commits(&[1000, 1005, 1010]);
    let plan = RewritePlan::offset(&records, -7200);

    execute_rewrite(&mut git, &plan).expect("rewrite succeeds");

    let applied = &git.rewrites[0];
    let new_times: Vec<i64> = applied.iter().map(|(_, t)| *t).collect();
    assert_eq!(new_times, vec![1000 - 7200, 1005 - 7200, 1010 - 7200]);
    // original order preserved
    let ids: Vec<&str> = applied.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids[0], records[0].id);
    assert_eq!(ids[2], records[2].id);
}

#[test]
fn push_with_no_unpushed_commits_creates_no_backup() {
    let mut git = FakeGit::with_branch("feature/time");

    let outcome = tempo_cli::push::run_push(&mut git, &[]).expect("push flow runs");

    assert_eq!(outcome, FlowOutcome::Completed);
    assert!(git.backups.is_empty());
    assert_eq!(git.ops, vec!["push:[]".to_string()]);
}

#[test]
fn dry_run_suppresses_every_mutation() {
    let mut inner = FakeGit::with_branch("main");
    inner.unpushed = commits(&[1000]);
    let mut dry = DryRun::new(inner);

    // queries pass through
    assert_eq!(dry.current_branch().unwrap(), "main");
    assert_eq!(dry.unpushed_commits().unwrap().len(), 1);

    // mutations are printed, not forwarded
    dry.stage_all().unwrap();
    dry.amend_head_time(1_700_000_000).unwrap();
    dry.commit(&["-m".to_string(), "msg".to_string()], Some(42)).unwrap();
    let plan = RewritePlan::offset(&commits(&[1000]), 60);
    dry.rewrite_times(plan.entries()).unwrap();
    dry.push(&[]).unwrap();
    dry.force_push_with_lease(&[]).unwrap();

    let backup = dry.create_backup_ref().unwrap();
    assert_eq!(backup, "tempo/backup-dry-run");
}

#[test]
fn individually_appended_plan_only_guards_adjacent_entries() {
    // ordering is enforced against the immediately preceding new value
    let records = commits(&[100, 200, 300]);
    let mut plan = RewritePlan::new();
    plan.append(records[0].clone(), 10_000);
    plan.append(records[1].clone(), 10_030); // crowds previous, adjusted
    let third = plan.append(records[2].clone(), 20_000); // clears previous, kept

    let times: Vec<i64> = plan.entries().iter().map(|e| e.new_time).collect();
    assert!(times[1] >= times[0] + 60);
    assert_eq!(third, 20_000);
}
