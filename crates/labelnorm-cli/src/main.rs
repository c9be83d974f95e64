use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use labelnorm_core::tracker::DEFAULT_MAX_ISSUES;
use labelnorm_core::{
    apply_plan, extract_labels, plan_project, AuthFile, CredentialSource, IssueSource, Result,
    SnapshotTracker, SyncOptions, SyncReport, VERSION,
};
use tracing_subscriber::EnvFilter;

/// labelnorm — canonical spellings for issue-tracker labels
///
/// Groups labels that differ only in case, punctuation or whitespace,
/// picks one lowercase spelling per group, and rewrites issues to use it.
#[derive(Parser)]
#[command(name = "labelnorm", version, about, long_about = None)]
struct Cli {
    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log debug detail to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where issues come from
#[derive(Args)]
struct Target {
    /// Project whose issues are normalized
    project: String,

    /// Path to the issue snapshot (JSON)
    #[arg(long, env = "LABELNORM_SNAPSHOT")]
    snapshot: PathBuf,

    /// Number of issues to look for labels in the project
    #[arg(long, default_value_t = DEFAULT_MAX_ISSUES)]
    max_issues: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every label occurrence in the project
    Labels {
        #[command(flatten)]
        target: Target,
    },

    /// Show the canonicalization mapping
    Map {
        #[command(flatten)]
        target: Target,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the label updates that would be written
    Plan {
        #[command(flatten)]
        target: Target,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite issue labels and save the snapshot
    Apply {
        #[command(flatten)]
        target: Target,
        /// Credentials file: user on line 1, password on line 2
        #[arg(long, env = "LABELNORM_AUTH_FILE")]
        auth_file: Option<PathBuf>,
        /// Compute updates without writing them
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("LABELNORM_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli.command, cli.quiet) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{} {}", "error:".red().bold(), e);
            2
        }
    };

    process::exit(exit_code);
}

fn run(command: Commands, quiet: bool) -> Result<i32> {
    match command {
        Commands::Labels { target } => cmd_labels(&target, quiet),
        Commands::Map { target, json } => cmd_map(&target, json, quiet),
        Commands::Plan { target, json } => cmd_plan(&target, json, quiet),
        Commands::Apply {
            target,
            auth_file,
            dry_run,
            json,
        } => cmd_apply(&target, auth_file, dry_run, json, quiet),
        Commands::Version => {
            println!(
                "labelnorm {} (labelnorm-core {})",
                env!("CARGO_PKG_VERSION"),
                VERSION
            );
            Ok(0)
        }
    }
}

fn options(target: &Target) -> SyncOptions {
    SyncOptions::new(target.project.as_str()).max_issues(target.max_issues)
}

// ── Commands ──────────────────────────────────────────────

fn cmd_labels(target: &Target, quiet: bool) -> Result<i32> {
    let tracker = SnapshotTracker::open(&target.snapshot)?;
    let issues = tracker.fetch_issues(&target.project, target.max_issues)?;
    if !quiet {
        for label in extract_labels(&issues) {
            println!("{}", label);
        }
    }
    Ok(0)
}

fn cmd_map(target: &Target, json: bool, quiet: bool) -> Result<i32> {
    let tracker = SnapshotTracker::open(&target.snapshot)?;
    let plan = plan_project(&tracker, &options(target))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan.mapping)?);
    } else if !quiet {
        for (canonical, spellings) in plan.mapping.groups() {
            let shown = if canonical.is_empty() {
                "\"\"".to_string()
            } else {
                canonical.to_string()
            };
            println!("{} {} {}", shown.green().bold(), "<-".dimmed(), spellings.join(", "));
        }
        println!(
            "{} labels, {} groups, {} spellings renamed",
            plan.mapping.len(),
            plan.mapping.groups().len(),
            plan.mapping.renames().count()
        );
    }
    Ok(0)
}

fn cmd_plan(target: &Target, json: bool, quiet: bool) -> Result<i32> {
    let tracker = SnapshotTracker::open(&target.snapshot)?;
    let plan = plan_project(&tracker, &options(target))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else if !quiet {
        for update in &plan.updates {
            let labels: Vec<&str> = update.labels.iter().map(String::as_str).collect();
            println!("{} -> [{}]", update.issue_id.bold(), labels.join(", "));
        }
        println!(
            "{} of {} issues need label updates",
            plan.updates.len(),
            plan.issues_scanned
        );
    }
    Ok(0)
}

fn cmd_apply(
    target: &Target,
    auth_file: Option<PathBuf>,
    dry_run: bool,
    json: bool,
    quiet: bool,
) -> Result<i32> {
    let mut tracker = SnapshotTracker::open(&target.snapshot)?;
    if let Some(path) = auth_file {
        let credentials = AuthFile::new(path).credentials()?;
        tracker = tracker.with_credentials(credentials);
    }

    let plan = plan_project(&tracker, &options(target))?;
    let report = apply_plan(&mut tracker, plan, dry_run);
    if tracker.is_dirty() {
        tracker.save()?;
        tracing::info!(
            snapshot = %target.snapshot.display(),
            updated = report.applied.len(),
            "snapshot saved"
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        print_report(&report);
    }

    Ok(if report.is_success() { 0 } else { 1 })
}

fn print_report(report: &SyncReport) {
    if report.dry_run {
        println!(
            "{} {} of {} issues would be updated",
            "dry run:".yellow().bold(),
            report.planned,
            report.issues_scanned
        );
        return;
    }
    for id in &report.applied {
        println!("{} {}", "updated".green(), id);
    }
    for failure in &report.failed {
        eprintln!("{} {}: {}", "failed".red(), failure.update.issue_id, failure.error);
    }
    println!(
        "{} updated, {} failed, {} unchanged",
        report.applied.len(),
        report.failed.len(),
        report.issues_scanned - report.planned
    );
}
