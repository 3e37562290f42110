//! # Verify Command Implementation
//!
//! Decodes a project descriptor and checks that every identifier listed in a
//! target's `buildPhases`, a phase's `files` or a build file's `fileRef`
//! resolves to an object. Also reports the application target that patches
//! would pick by default.
//!
//! This command is read-only.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use pbxpatch::filesystem;
use pbxpatch::output::{emoji, OutputConfig, Status};
use pbxpatch::project::codec;
use pbxpatch::project::query::Query;

/// Check a descriptor for dangling references
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The .xcodeproj bundle, its directory, or its project.pbxproj
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,
}

/// Execute the `verify` command.
pub fn execute(args: VerifyArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let path = filesystem::descriptor_path(&args.project)?;
    let doc = codec::load(&path)
        .with_context(|| format!("Failed to load project from {}", path.display()))?;

    println!(
        "{} {}",
        emoji(&out, "🔍", "[SCAN]"),
        out.heading(&path.display().to_string())
    );
    println!(
        "   {} objects, {} targets, objectVersion {}",
        doc.objects.len(),
        doc.targets().count(),
        doc.object_version()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    match doc.objects.find_first(&Query::AppTarget) {
        Some(id) => {
            let name = doc.objects.target(id.as_str())?.name.clone();
            println!("   application target: {} ({})", name, id);
        }
        None => println!("   application target: none"),
    }

    let dangling = doc.objects.dangling_references();
    if dangling.is_empty() {
        println!("{}", Status::Ok.line(&out, "no dangling references"));
        return Ok(());
    }
    for reference in &dangling {
        println!("{}", Status::Failed.line(&out, reference));
    }
    anyhow::bail!(
        "{} dangling references in {}",
        dangling.len(),
        path.display()
    )
}
