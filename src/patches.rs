//! # Patch Scripts
//!
//! Named project changes composed from the [`Editor`] primitives. Each
//! script resolves every target it needs before its first mutation, so a
//! missing target fails the script with the graph untouched.

use log::{info, warn};

use crate::error::{Error, Result};
use crate::project::edit::Editor;
use crate::project::query::Query;
use crate::project::{Identifier, ObjectGraph, PhaseKind};

/// `sourceTree` of file references created by the scripts.
pub const SOURCE_ROOT: &str = "SOURCE_ROOT";

pub const FRAMEWORK_FILE_TYPE: &str = "wrapper.framework";

pub const FOLDER_FILE_TYPE: &str = "folder";

/// What [`embed_framework`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOutcome {
    pub target: Identifier,
    pub file_ref: Identifier,
    pub phase: Identifier,
    pub build_file: Identifier,
    /// Build files dropped from the target's link phases.
    pub unlinked: usize,
}

/// What [`move_resource`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub file_ref: Identifier,
    pub phase: Identifier,
    pub build_file: Identifier,
    /// Build files dropped from the source target's resource phases.
    pub removed: usize,
}

/// The named native target, or the application target when no name is given.
pub fn select_target(graph: &ObjectGraph, name: Option<&str>) -> Result<Identifier> {
    match name {
        Some(name) => graph.require(&Query::NativeTargetName(name.to_string())),
        None => graph.require(&Query::AppTarget),
    }
}

/// Copy a framework into the target's bundle.
///
/// The framework moves from the target's link phases into its Embed
/// Frameworks phase unless `keep_linked` is set.
pub fn embed_framework(
    editor: &mut Editor<'_>,
    framework: &str,
    target: Option<&str>,
    keep_linked: bool,
) -> Result<EmbedOutcome> {
    let target = select_target(editor.graph(), target)?;
    let file_ref = editor.ensure_file_reference(framework, SOURCE_ROOT, FRAMEWORK_FILE_TYPE)?;
    let phase = editor.find_or_create_embed_phase(&target)?;
    let build_file = editor.add_build_file_to_phase(&phase, &file_ref, true)?;
    let unlinked = if keep_linked {
        0
    } else {
        editor.remove_from_phases_by_kind(&target, &file_ref, PhaseKind::Frameworks)?
    };
    info!(
        "embedded {} in target {} ({} link entries removed)",
        framework, target, unlinked
    );
    Ok(EmbedOutcome {
        target,
        file_ref,
        phase,
        build_file,
        unlinked,
    })
}

/// Move a folder resource from one target's bundle into another's.
///
/// A missing source target is skipped with a warning; the destination must
/// exist and have a Resources phase.
pub fn move_resource(
    editor: &mut Editor<'_>,
    path: &str,
    from_target: &str,
    to_target: &str,
) -> Result<MoveOutcome> {
    let destination = editor
        .graph()
        .require(&Query::NativeTargetName(to_target.to_string()))?;
    let phase = editor
        .graph()
        .target_phase(&destination, PhaseKind::Resources)?
        .ok_or_else(|| {
            Error::not_found(format!("{} phase of target {:?}", PhaseKind::Resources, to_target))
        })?;
    let source = editor
        .graph()
        .find_first(&Query::NativeTargetName(from_target.to_string()))
        .cloned();

    let name = path.rsplit('/').find(|part| !part.is_empty()).unwrap_or(path);
    let file_ref =
        editor.ensure_named_file_reference(path, Some(name), SOURCE_ROOT, FOLDER_FILE_TYPE)?;

    let removed = match source {
        Some(source) => {
            editor.remove_from_phases_by_kind(&source, &file_ref, PhaseKind::Resources)?
        }
        None => {
            warn!("target {:?} not found, nothing to remove {} from", from_target, path);
            0
        }
    };
    let build_file = editor.add_build_file_to_phase(&phase, &file_ref, false)?;
    info!("moved {} from {} to {}", path, from_target, to_target);
    Ok(MoveOutcome {
        file_ref,
        phase,
        build_file,
        removed,
    })
}

/// Expose the first header under `marker` in the framework's public headers.
pub fn public_header(editor: &mut Editor<'_>, marker: &str) -> Result<Identifier> {
    editor.set_header_visibility_public(marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::*;
    use crate::project::{Object, SequentialIdentifiers};

    fn editor(graph: &mut ObjectGraph) -> Editor<'_> {
        Editor::with_identifiers(graph, SequentialIdentifiers::starting_at(0xE000))
    }

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    #[test]
    fn test_embed_unity_framework() {
        let mut graph = unity_link_graph();
        let outcome = embed_framework(&mut editor(&mut graph), "UnityFramework.framework", None, false)
            .unwrap();

        assert_eq!(outcome.target, id(APP_TARGET));
        assert_eq!(outcome.file_ref, id(FRAMEWORK_REF));
        assert_eq!(outcome.unlinked, 1);

        let embed_phases: Vec<_> = graph.find_all(&Query::EmbedFrameworksPhase).collect();
        assert_eq!(embed_phases, vec![&outcome.phase]);
        let phase = graph.get(outcome.phase.as_str()).and_then(Object::as_build_phase).unwrap();
        assert_eq!(phase.files, vec![outcome.build_file.clone()]);

        let build_file = graph
            .get(outcome.build_file.as_str())
            .and_then(Object::as_build_file)
            .unwrap();
        assert_eq!(build_file.file_ref, Some(id(FRAMEWORK_REF)));
        assert_eq!(
            build_file.attributes().unwrap().iter().collect::<Vec<_>>(),
            vec!["CodeSignOnCopy", "RemoveHeadersOnCopy"]
        );

        assert!(graph.phase_entries_for(&id(LINK_PHASE), &id(FRAMEWORK_REF)).is_empty());
        assert!(graph.dangling_references().is_empty());
    }

    #[test]
    fn test_embed_twice_changes_nothing() {
        let mut graph = unity_link_graph();
        embed_framework(&mut editor(&mut graph), "UnityFramework.framework", None, false).unwrap();
        let once = graph.clone();
        embed_framework(&mut editor(&mut graph), "UnityFramework.framework", None, false).unwrap();
        assert_eq!(graph, once);
    }

    #[test]
    fn test_embed_keep_linked() {
        let mut graph = unity_link_graph();
        let outcome = embed_framework(
            &mut editor(&mut graph),
            "UnityFramework.framework",
            Some("MyGame-mobile"),
            true,
        )
        .unwrap();
        assert_eq!(outcome.unlinked, 0);
        assert!(graph.contains(FRAMEWORK_LINK));
    }

    #[test]
    fn test_embed_creates_missing_file_reference() {
        let mut graph = unity_link_graph();
        let outcome =
            embed_framework(&mut editor(&mut graph), "Vendor.framework", None, false).unwrap();
        let file = graph
            .get(outcome.file_ref.as_str())
            .and_then(Object::as_file_reference)
            .unwrap();
        assert_eq!(file.source_tree.as_deref(), Some("SOURCE_ROOT"));
        assert_eq!(file.explicit_file_type.as_deref(), Some("wrapper.framework"));
    }

    #[test]
    fn test_embed_unknown_target_leaves_graph_unmodified() {
        let mut graph = unity_link_graph();
        let before = graph.clone();
        let err = embed_framework(
            &mut editor(&mut graph),
            "UnityFramework.framework",
            Some("Unity-iPhone"),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("native target named \"Unity-iPhone\""));
        assert_eq!(graph, before);
    }

    fn resource_graph() -> ObjectGraph {
        let mut graph = unity_link_graph();
        graph.insert(id("R1"), phase(PhaseKind::Resources, &["R3"]));
        graph.insert(id("R2"), phase(PhaseKind::Resources, &[]));
        graph.insert(id("R3"), build_file("R4"));
        graph.insert(
            id("R4"),
            Object::FileReference(crate::project::FileReference {
                path: Some("Data".to_string()),
                ..Default::default()
            }),
        );
        graph.insert(id("T1"), target("Unity-iPhone", &["R1"]));
        graph.insert(id("T2"), target("UnityFramework", &["R2"]));
        graph
    }

    #[test]
    fn test_move_resource_between_targets() {
        let mut graph = resource_graph();
        let outcome =
            move_resource(&mut editor(&mut graph), "Data", "Unity-iPhone", "UnityFramework").unwrap();

        assert_eq!(outcome.file_ref, id("R4"));
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.phase, id("R2"));
        assert!(!graph.contains("R3"));

        let from = graph.get("R1").and_then(Object::as_build_phase).unwrap();
        assert!(from.files.is_empty());
        let to = graph.get("R2").and_then(Object::as_build_phase).unwrap();
        assert_eq!(to.files, vec![outcome.build_file]);
        assert!(graph.dangling_references().is_empty());
    }

    #[test]
    fn test_move_resource_names_new_folder() {
        let mut graph = resource_graph();
        let outcome = move_resource(
            &mut editor(&mut graph),
            "Build/Assets/",
            "Unity-iPhone",
            "UnityFramework",
        )
        .unwrap();
        let file = graph
            .get(outcome.file_ref.as_str())
            .and_then(Object::as_file_reference)
            .unwrap();
        assert_eq!(file.name.as_deref(), Some("Assets"));
        assert_eq!(file.explicit_file_type.as_deref(), Some("folder"));
    }

    #[test]
    fn test_move_resource_skips_missing_source() {
        let mut graph = resource_graph();
        let outcome =
            move_resource(&mut editor(&mut graph), "Data", "Nowhere", "UnityFramework").unwrap();
        assert_eq!(outcome.removed, 0);
        assert!(graph.contains("R3"));
    }

    #[test]
    fn test_move_resource_requires_destination_resources_phase() {
        let mut graph = resource_graph();
        let before = graph.clone();
        let err =
            move_resource(&mut editor(&mut graph), "Data", "Unity-iPhone", "MyGame-mobile")
                .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.to_string().contains("resources phase"));
        assert_eq!(graph, before);
    }

    #[test]
    fn test_select_target() {
        let graph = unity_link_graph();
        assert_eq!(select_target(&graph, None).unwrap(), id(APP_TARGET));
        assert_eq!(select_target(&graph, Some("MyGame-mac")).unwrap(), id(MAC_TARGET));
    }
}
