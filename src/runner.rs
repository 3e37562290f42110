//! # Recipe Runner
//!
//! Executes recipe steps in order. Descriptor steps edit an in-memory
//! [`ProjectDocument`], loaded once per descriptor path and shared by every
//! later step on the same project. Host-file steps (workspace, copies, text
//! patches, build-log checks) take effect as they run.
//!
//! Descriptors are encoded and written only after every step succeeded, so a
//! failing step leaves all of them untouched on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::buildlog;
use crate::config::{Step, TextPatchOp};
use crate::error::Result;
use crate::filesystem;
use crate::patches;
use crate::project::codec;
use crate::project::edit::Editor;
use crate::project::ProjectDocument;
use crate::textpatch::TextPatch;
use crate::workspace::{self, Workspace};

/// What one step changed, for the CLI to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub detail: String,
}

/// Result of a complete run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    /// Descriptors written at the end of the run, by canonical path.
    pub written: Vec<PathBuf>,
}

/// Runs recipe steps against the file system
#[derive(Debug, Default)]
pub struct Runner {
    dry_run: bool,
    documents: BTreeMap<PathBuf, ProjectDocument>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// With `dry_run`, descriptor edits are computed but never written and
    /// host-file steps are only logged. Build-log checks still run.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The in-memory document for a descriptor, loading it on first use.
    ///
    /// Documents are keyed by canonical path, so every spelling of the same
    /// descriptor (`./Game.xcodeproj`, `sub/../Game.xcodeproj`, a symlink)
    /// shares one document and is written once.
    fn document(&mut self, project: &Path) -> Result<&mut ProjectDocument> {
        let path = fs::canonicalize(filesystem::descriptor_path(project)?)?;
        if !self.documents.contains_key(&path) {
            let doc = codec::load(&path)?;
            self.documents.insert(path.clone(), doc);
        }
        let doc = self
            .documents
            .get_mut(&path)
            .ok_or_else(|| crate::error::Error::not_found(path.display()))?;
        Ok(doc)
    }

    /// Documents edited so far, by canonical descriptor path.
    pub fn documents(&self) -> &BTreeMap<PathBuf, ProjectDocument> {
        &self.documents
    }

    /// Run every step, then write the edited descriptors.
    pub fn run(mut self, steps: &[Step]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for (index, step) in steps.iter().enumerate() {
            info!("step {}/{}: {}", index + 1, steps.len(), step);
            let detail = self.run_step(step)?;
            report.steps.push(StepReport {
                step: step.to_string(),
                detail,
            });
        }

        if self.dry_run {
            info!("dry run: {} descriptors left unwritten", self.documents.len());
            return Ok(report);
        }
        for (path, doc) in &self.documents {
            codec::save(doc, path)?;
            report.written.push(path.clone());
        }
        Ok(report)
    }

    fn run_step(&mut self, step: &Step) -> Result<String> {
        match step {
            Step::EmbedFramework { embed_framework: op } => {
                let doc = self.document(&op.project)?;
                let outcome = patches::embed_framework(
                    &mut Editor::new(&mut doc.objects),
                    &op.framework,
                    op.target.as_deref(),
                    op.keep_linked,
                )?;
                Ok(format!(
                    "embed phase {}, build file {}, {} link entries removed",
                    outcome.phase, outcome.build_file, outcome.unlinked
                ))
            }
            Step::MoveResource { move_resource: op } => {
                let doc = self.document(&op.project)?;
                let outcome = patches::move_resource(
                    &mut Editor::new(&mut doc.objects),
                    &op.path,
                    &op.from_target,
                    &op.to_target,
                )?;
                Ok(format!(
                    "resources phase {}, build file {}, {} entries removed",
                    outcome.phase, outcome.build_file, outcome.removed
                ))
            }
            Step::PublicHeader { public_header: op } => {
                let doc = self.document(&op.project)?;
                let build_file =
                    patches::public_header(&mut Editor::new(&mut doc.objects), &op.marker)?;
                Ok(format!("build file {} is public", build_file))
            }
            Step::Workspace { workspace: op } => {
                let contents = contents_file(&op.workspace);
                let location = workspace::absolute_location(&op.project)?;
                let mut ws = Workspace::load(&contents)?;
                if !ws.ensure_file_ref(&location) {
                    return Ok(format!("{} already listed", location));
                }
                if self.dry_run {
                    return Ok(format!("would add {}", location));
                }
                ws.save(&contents)?;
                Ok(format!("added {}", location))
            }
            Step::ReplaceDir { replace_dir: op } => {
                if self.dry_run {
                    return Ok(format!("would replace {}", op.to.display()));
                }
                let copied = filesystem::replace_dir(&op.from, &op.to)?;
                Ok(format!("{} files copied", copied))
            }
            Step::CopyFile { copy_file: op } => {
                if self.dry_run {
                    return Ok(format!("would overwrite {}", op.to.display()));
                }
                filesystem::copy_file(&op.from, &op.to)?;
                Ok(format!("overwrote {}", op.to.display()))
            }
            Step::TextPatch { text_patch: op } => {
                let patch = text_patch(op);
                if self.dry_run {
                    let source = fs::read_to_string(&op.file)?;
                    patch.apply_to(&source, &op.file.display().to_string())?;
                    return Ok(format!("would patch {}", op.file.display()));
                }
                patch.apply_to_file(&op.file)?;
                Ok(format!("{:?} -> {:?}", patch.find, patch.replace))
            }
            Step::BuildLog { build_log: op } => {
                let marker = op.marker.as_deref().unwrap_or(buildlog::SUCCESS_MARKER);
                buildlog::check_file(&op.log, marker)?;
                Ok(format!("{:?} found", marker))
            }
        }
    }
}

fn text_patch(op: &TextPatchOp) -> TextPatch {
    let patch = TextPatch::new(op.method.clone());
    let find = op.find.clone().unwrap_or_else(|| patch.find.clone());
    let replace = op.replace.clone().unwrap_or_else(|| patch.replace.clone());
    patch.with_literal(find, replace)
}

/// Accept either the `.xcworkspace` bundle or its contents file.
pub fn contents_file(workspace: &Path) -> PathBuf {
    if workspace
        .extension()
        .is_some_and(|ext| ext == workspace::WORKSPACE_EXTENSION)
    {
        workspace.join(workspace::CONTENTS_FILE)
    } else {
        debug!("treating {} as a contents file", workspace.display());
        workspace.to_path_buf()
    }
}
