//! Tempo CLI
//!
//! Interactive commit timestamp editing for git.
//!
//! Commands:
//! - tempo commit [--amend] [--dry-run] [-- <git commit args>]
//! - tempo push [--dry-run] [-- <git push args>]
//! - tempo presets

use anyhow::Result;
use clap::{Parser, Subcommand};

use tempo_cli::commit::{run_amend, run_commit};
use tempo_cli::push::run_push;
use tempo_cli::{DryRun, FlowOutcome, Git, GitCli};
use tempo_core::all_presets;

#[derive(Parser)]
#[command(name = "tempo")]
#[command(about = "Interactive commit timestamp editing for git")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively build a commit, or amend HEAD's timestamp
    Commit {
        /// Only amend HEAD's timestamp, keeping message and content
        #[arg(long)]
        amend: bool,

        /// Print mutating git calls instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Extra arguments passed through to `git commit`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Push, optionally rewriting unpushed commit timestamps first
    Push {
        /// Print mutating git calls instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Extra arguments passed through to `git push`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List available cadence presets
    Presets,
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn backend(dry_run: bool) -> Box<dyn Git> {
    if dry_run {
        Box::new(DryRun::new(GitCli::new()))
    } else {
        Box::new(GitCli::new())
    }
}

fn finish(outcome: FlowOutcome) -> i32 {
    match &outcome {
        FlowOutcome::Completed => {}
        FlowOutcome::Cancelled => eprintln!("Cancelled."),
        FlowOutcome::Precondition(msg) => eprintln!("Error: {}", msg),
    }
    outcome.exit_code()
}

fn list_presets() {
    for preset in all_presets() {
        let window = match preset.hour_window {
            Some((start, end)) => format!("{:02}:00-{:02}:00", start, end),
            None => "any hour".to_string(),
        };
        println!(
            "{:16} gap {}s-{}s  {:13} {}",
            preset.name, preset.gap_min, preset.gap_max, window, preset.description
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Commit {
            amend,
            dry_run,
            verbose,
            args,
        } => {
            init_logging(verbose)?;
            let mut git = backend(dry_run);
            let outcome = if amend {
                run_amend(git.as_mut())
            } else {
                run_commit(git.as_mut(), &args)
            };
            match outcome {
                Ok(outcome) => finish(outcome),
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    1
                }
            }
        }
        Commands::Push {
            dry_run,
            verbose,
            args,
        } => {
            init_logging(verbose)?;
            let mut git = backend(dry_run);
            match run_push(git.as_mut(), &args) {
                Ok(outcome) => finish(outcome),
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    1
                }
            }
        }
        Commands::Presets => {
            init_logging(false)?;
            list_presets();
            0
        }
    };

    std::process::exit(code);
}
