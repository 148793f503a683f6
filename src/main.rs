use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use preview_patcher::{logging, Patcher};
use similar::{ChangeTag, TextDiff};
use std::path::Path;

#[derive(Parser)]
#[command(name = "preview-patcher")]
#[command(
    about = "Retrofit the blob-backed report preview into ClientMonthlyReport.jsx",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Log rule outcomes to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let patcher = Patcher::builtin(".")?;
    let plan = patcher.plan()?;

    if cli.verbose > 0 {
        for line in patcher.outcome_lines(&plan) {
            eprintln!("{}", line.dimmed());
        }
    }

    if cli.diff && plan.is_changed() {
        display_diff(patcher.target(), plan.original(), plan.patched());
    }

    if cli.dry_run {
        println!("{}", patcher.dry_run_status(&plan).cyan());
        return Ok(());
    }

    let report = patcher.commit(plan)?;
    let status = report.status_line();
    if report.is_changed() {
        println!("{}", status.green());
    } else {
        println!("{}", status.yellow());
    }

    Ok(())
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
