//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which prints a project's
//! native targets, their build phases in build order, and the files each
//! phase holds.
//!
//! This command is read-only.

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::PathBuf;

use pbxpatch::filesystem;
use pbxpatch::project::{codec, Identifier, Object, ObjectGraph, ProjectDocument};

/// Show targets, build phases and their files
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// The .xcodeproj bundle, its directory, or its project.pbxproj
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Only show this target
    #[arg(short, long)]
    pub target: Option<String>,

    /// Hide phase contents
    #[arg(long)]
    pub phases_only: bool,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs) -> Result<()> {
    let path = filesystem::descriptor_path(&args.project)?;
    let doc = codec::load(&path)
        .with_context(|| format!("Failed to load project from {}", path.display()))?;

    let root = build_tree(&doc, &path.display().to_string(), &args);
    if let Some(name) = &args.target {
        if root.children.is_empty() {
            anyhow::bail!("No native target named {:?}", name);
        }
    }
    print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    Ok(())
}

fn build_tree(doc: &ProjectDocument, label: &str, args: &TreeArgs) -> TreeNode {
    let children = doc
        .targets()
        .filter(|(_, target)| args.target.as_ref().is_none_or(|name| target.name == *name))
        .map(|(id, target)| TreeNode {
            label: format!("{} ({})", target.name, id),
            children: target
                .build_phases
                .iter()
                .map(|phase| phase_node(&doc.objects, phase, args.phases_only))
                .collect(),
        })
        .collect();
    TreeNode {
        label: label.to_string(),
        children,
    }
}

fn phase_node(graph: &ObjectGraph, id: &Identifier, phases_only: bool) -> TreeNode {
    let Some(phase) = graph.get(id.as_str()).and_then(Object::as_build_phase) else {
        return TreeNode::leaf(format!("{} (missing)", id));
    };
    let children = if phases_only {
        Vec::new()
    } else {
        phase
            .files
            .iter()
            .map(|build_file| TreeNode::leaf(file_label(graph, build_file)))
            .collect()
    };
    TreeNode {
        label: format!("{} [{}]", phase.label(), phase.files.len()),
        children,
    }
}

fn file_label(graph: &ObjectGraph, build_file_id: &Identifier) -> String {
    let Some(build_file) = graph
        .get(build_file_id.as_str())
        .and_then(Object::as_build_file)
    else {
        return format!("{} (missing)", build_file_id);
    };
    let path = build_file
        .file_ref
        .as_ref()
        .and_then(|id| graph.get(id.as_str()))
        .and_then(Object::as_file_reference)
        .and_then(|file| file.path.clone().or_else(|| file.name.clone()))
        .unwrap_or_else(|| "?".to_string());
    match build_file.attributes() {
        Some(attributes) if !attributes.is_empty() => {
            format!("{} {{{}}}", path, attributes.iter().collect::<Vec<_>>().join(", "))
        }
        _ => path,
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"{
        objects = {
            F1 = { isa = PBXFileReference; path = UnityFramework.framework; };
            B1 = { isa = PBXBuildFile; fileRef = F1; settings = { ATTRIBUTES = ( CodeSignOnCopy ); }; };
            C1 = { isa = PBXCopyFilesBuildPhase; dstSubfolderSpec = 10; name = "Embed Frameworks"; files = ( B1, B9 ); };
            T1 = { isa = PBXNativeTarget; name = Game; buildPhases = ( C1, X1 ); };
            T2 = { isa = PBXNativeTarget; name = GameTests; buildPhases = ( ); };
        };
    }"#;

    fn args(target: Option<&str>, phases_only: bool) -> TreeArgs {
        TreeArgs {
            project: PathBuf::from("unused"),
            target: target.map(str::to_string),
            phases_only,
        }
    }

    #[test]
    fn test_build_tree() {
        let doc = codec::decode(DESCRIPTOR.as_bytes()).unwrap();
        let root = build_tree(&doc, "project.pbxproj", &args(None, false));
        assert_eq!(root.children.len(), 2);

        let game = &root.children[0];
        assert_eq!(game.label, "Game (T1)");
        assert_eq!(game.children[0].label, "Embed Frameworks [2]");
        assert_eq!(game.children[1].label, "X1 (missing)");

        let files: Vec<_> = game.children[0].children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(files, vec!["UnityFramework.framework {CodeSignOnCopy}", "B9 (missing)"]);
    }

    #[test]
    fn test_target_filter_and_phases_only() {
        let doc = codec::decode(DESCRIPTOR.as_bytes()).unwrap();
        let root = build_tree(&doc, "p", &args(Some("Game"), true));
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].children[0].children.is_empty());
    }

    #[test]
    fn test_execute_missing_project() {
        let result = execute(TreeArgs {
            project: PathBuf::from("/nonexistent/Game.xcodeproj"),
            target: None,
            phases_only: false,
        });
        assert!(result.is_err());
    }
}
