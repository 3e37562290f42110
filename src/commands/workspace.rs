//! # Workspace Command Implementation
//!
//! Subcommands for `.xcworkspace` files:
//!
//! - `add`: reference a project by absolute path (no-op if already listed)
//! - `create`: write a new workspace listing the given projects
//! - `relativize`: rewrite absolute locations under build roots to
//!   container-relative ones

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use pbxpatch::output::{OutputConfig, Status};
use pbxpatch::runner::contents_file;
use pbxpatch::workspace::{self, Workspace, DEFAULT_BUILD_ROOTS};

/// Create and update .xcworkspace files
#[derive(Args, Debug)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    /// Add a project to a workspace
    Add {
        /// The .xcworkspace bundle or its contents.xcworkspacedata.
        /// Searched for under the current directory when omitted.
        #[arg(short, long, value_name = "PATH")]
        workspace: Option<PathBuf>,

        /// The .xcodeproj bundle, or a directory holding one
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Show what would be done without writing the workspace
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Create a workspace listing the given projects
    Create {
        /// Directory to create the workspace in
        #[arg(short, long, value_name = "DIR", default_value = "XcodeWorkspace")]
        dir: PathBuf,

        /// Product name; the workspace is named after its alphanumeric
        /// characters followed by "WS"
        #[arg(long)]
        product: String,

        /// Project bundles to list
        #[arg(value_name = "PROJECT", required = true)]
        projects: Vec<PathBuf>,
    },

    /// Rewrite absolute locations under build roots as container-relative
    Relativize {
        /// The .xcworkspace bundle or its contents.xcworkspacedata
        #[arg(value_name = "WORKSPACE")]
        workspace: PathBuf,

        /// Build-root directory names (default: UnityBuild, CocosBuild)
        #[arg(long = "root", value_name = "NAME")]
        roots: Vec<String>,

        /// Show what would be done without writing the workspace
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

/// Execute the workspace command
pub fn execute(args: WorkspaceArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    match args.command {
        WorkspaceCommand::Add {
            workspace,
            project,
            dry_run,
        } => {
            let contents = match workspace {
                Some(path) => contents_file(&path),
                None => workspace::find_workspace(&std::env::current_dir()?)?,
            };
            let project = if project
                .extension()
                .is_some_and(|ext| ext == pbxpatch::filesystem::PROJECT_EXTENSION)
            {
                project
            } else {
                pbxpatch::filesystem::find_project(&project)?
            };
            let location = workspace::absolute_location(&project)?;

            let mut ws = Workspace::load(&contents)
                .with_context(|| format!("Failed to read workspace {}", contents.display()))?;
            if !ws.ensure_file_ref(&location) {
                println!("{}", Status::Unchanged.line(&out, format!("{} already in workspace", location)));
            } else if dry_run {
                println!("{}", Status::DryRun.line(&out, format!("would add {}", location)));
            } else {
                ws.save(&contents)?;
                println!("{}", Status::Ok.line(&out, format!("added {}", location)));
            }
        }
        WorkspaceCommand::Create {
            dir,
            product,
            projects,
        } => {
            let contents = workspace::contents_path(&dir, &workspace::workspace_name(&product));
            let ws = workspace::create(&contents, &projects)?;
            println!(
                "{}",
                Status::Ok.line(
                    &out,
                    format!("created {} with {} projects", contents.display(), ws.locations().len())
                )
            );
        }
        WorkspaceCommand::Relativize {
            workspace,
            roots,
            dry_run,
        } => {
            let contents = contents_file(&workspace);
            let roots: Vec<String> = if roots.is_empty() {
                DEFAULT_BUILD_ROOTS.iter().map(|r| r.to_string()).collect()
            } else {
                roots
            };
            let mut ws = Workspace::load(&contents)
                .with_context(|| format!("Failed to read workspace {}", contents.display()))?;
            let changed = ws.relativize(&roots);
            if changed == 0 {
                println!("{}", Status::Unchanged.line(&out, "no absolute locations under build roots"));
            } else if dry_run {
                println!("{}", Status::DryRun.line(&out, format!("would rewrite {} locations", changed)));
            } else {
                ws.save(&contents)?;
                println!("{}", Status::Ok.line(&out, format!("rewrote {} locations", changed)));
            }
        }
    }
    Ok(())
}
