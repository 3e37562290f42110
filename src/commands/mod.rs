//! # CLI Command Implementations
//!
//! One module per `pbxpatch` subcommand. Each module defines an `Args`
//! struct derived with `clap` and an `execute` function that calls into the
//! `pbxpatch` library and prints the result.
//!
//! The single-patch commands (`embed`, `move-resource`, `public-header`)
//! build a one-step recipe and run it exactly like `apply` does.

pub mod apply;
pub mod build_log;
pub mod embed;
pub mod move_resource;
pub mod public_header;
pub mod tree;
pub mod verify;
pub mod workspace;

use anyhow::{Context, Result};

use pbxpatch::config::Step;
use pbxpatch::output::{OutputConfig, Status};
use pbxpatch::runner::{RunReport, Runner};

/// Run `steps` as one run and print what each step did.
pub(crate) fn run_steps(steps: &[Step], dry_run: bool, out: &OutputConfig) -> Result<RunReport> {
    let report = Runner::new()
        .dry_run(dry_run)
        .run(steps)
        .with_context(|| match steps {
            [step] => format!("Failed to {}", step),
            _ => "Recipe run failed; no project was written".to_string(),
        })?;
    print_report(&report, dry_run, out);
    Ok(report)
}

fn print_report(report: &RunReport, dry_run: bool, out: &OutputConfig) {
    let status = if dry_run { Status::DryRun } else { Status::Ok };
    for step in &report.steps {
        println!("{}", status.line(out, &step.step));
        println!("   {}", out.dim(&step.detail));
    }
    for path in &report.written {
        println!("{}", Status::Ok.line(out, format!("wrote {}", path.display())));
    }
    if dry_run {
        println!(
            "{}",
            Status::DryRun.line(out, "no files were changed")
        );
    }
}
