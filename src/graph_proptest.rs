//! Property-based tests for the graph mutation layer.
//!
//! These tests use proptest to build random phases and paths and check that
//! the editor's invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::project::edit::Editor;
    use crate::project::query::Query;
    use crate::project::{
        codec, BuildFile, BuildPhase, FileReference, Identifier, NativeTarget, Object,
        ObjectGraph, PhaseKind, ProjectDocument, SequentialIdentifiers,
    };
    use proptest::prelude::*;

    const TARGET: &str = "T0";
    const PHASE: &str = "P0";

    fn file_ref_id(i: usize) -> Identifier {
        Identifier::new(format!("F{:03}", i))
    }

    fn build_file_id(i: usize) -> Identifier {
        Identifier::new(format!("B{:03}", i))
    }

    /// One target whose only phase of `kind` holds a build file for each of
    /// `count` distinct file references.
    fn graph_with_phase(kind: PhaseKind, count: usize) -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        let mut phase = BuildPhase::new(kind);
        for i in 0..count {
            graph.insert(
                file_ref_id(i),
                Object::FileReference(FileReference {
                    path: Some(format!("lib{}.a", i)),
                    ..Default::default()
                }),
            );
            graph.insert(
                build_file_id(i),
                Object::BuildFile(BuildFile {
                    file_ref: Some(file_ref_id(i)),
                    ..Default::default()
                }),
            );
            phase.files.push(build_file_id(i));
        }
        graph.insert(Identifier::new(PHASE), Object::BuildPhase(phase));
        graph.insert(
            Identifier::new(TARGET),
            Object::NativeTarget(NativeTarget {
                name: "Game".to_string(),
                build_phases: vec![Identifier::new(PHASE)],
                ..Default::default()
            }),
        );
        graph
    }

    fn editor(graph: &mut ObjectGraph) -> Editor<'_> {
        Editor::with_identifiers(graph, SequentialIdentifiers::starting_at(0xC000))
    }

    // ============================================================================
    // ensure_file_reference
    // ============================================================================

    proptest! {
        /// Property: ensuring the same path twice yields one identifier and
        /// one new object
        #[test]
        fn ensure_file_reference_is_idempotent(path in "[A-Za-z0-9_./-]{1,40}", repeats in 1usize..5) {
            let mut graph = graph_with_phase(PhaseKind::Frameworks, 2);
            let before = graph.len();
            let query = Query::FileReferencePath(path.clone());
            let existed = graph.find_first(&query).is_some();
            let mut editor = editor(&mut graph);

            let first = editor.ensure_file_reference(&path, "SOURCE_ROOT", "folder").unwrap();
            for _ in 0..repeats {
                let again = editor.ensure_file_reference(&path, "SOURCE_ROOT", "folder").unwrap();
                prop_assert_eq!(&again, &first);
            }

            prop_assert_eq!(graph.find_all(&query).count(), 1);
            prop_assert_eq!(graph.len(), before + usize::from(!existed));
        }
    }

    // ============================================================================
    // remove_from_phases_by_kind
    // ============================================================================

    proptest! {
        /// Property: removing one file keeps the other N-1 entries in order
        /// and deletes exactly its build file
        #[test]
        fn remove_preserves_order(count in 1usize..20, pick in any::<prop::sample::Index>()) {
            let mut graph = graph_with_phase(PhaseKind::Frameworks, count);
            let victim = pick.index(count);

            let removed = editor(&mut graph)
                .remove_from_phases_by_kind(
                    &Identifier::new(TARGET),
                    &file_ref_id(victim),
                    PhaseKind::Frameworks,
                )
                .unwrap();
            prop_assert_eq!(removed, 1);

            let expected: Vec<_> = (0..count).filter(|i| *i != victim).map(build_file_id).collect();
            let phase = graph.get(PHASE).and_then(Object::as_build_phase).unwrap();
            prop_assert_eq!(&phase.files, &expected);
            prop_assert!(!graph.contains(build_file_id(victim).as_str()));
            prop_assert!(graph.dangling_references().is_empty());
        }

        /// Property: removal from a different phase kind changes nothing
        #[test]
        fn remove_other_kind_is_noop(count in 1usize..10, pick in any::<prop::sample::Index>()) {
            let mut graph = graph_with_phase(PhaseKind::Resources, count);
            let before = graph.clone();
            let removed = editor(&mut graph)
                .remove_from_phases_by_kind(
                    &Identifier::new(TARGET),
                    &file_ref_id(pick.index(count)),
                    PhaseKind::Frameworks,
                )
                .unwrap();
            prop_assert_eq!(removed, 0);
            prop_assert_eq!(graph, before);
        }
    }

    // ============================================================================
    // embed sequence
    // ============================================================================

    proptest! {
        /// Property: embedding any subset of linked files, in any order and
        /// any number of times, leaves no dangling reference and one embed
        /// phase holding each embedded file once
        #[test]
        fn embed_sequence_keeps_graph_consistent(
            count in 1usize..8,
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..12),
        ) {
            let mut graph = graph_with_phase(PhaseKind::Frameworks, count);
            let target = Identifier::new(TARGET);
            let mut embedded = std::collections::BTreeSet::new();
            {
                let mut editor = editor(&mut graph);
                for pick in &picks {
                    let i = pick.index(count);
                    let phase = editor.find_or_create_embed_phase(&target).unwrap();
                    editor.add_build_file_to_phase(&phase, &file_ref_id(i), true).unwrap();
                    editor
                        .remove_from_phases_by_kind(&target, &file_ref_id(i), PhaseKind::Frameworks)
                        .unwrap();
                    embedded.insert(i);
                }
            }

            prop_assert!(graph.dangling_references().is_empty());
            let embed_phases: Vec<_> = graph.find_all(&Query::EmbedFrameworksPhase).cloned().collect();
            prop_assert_eq!(embed_phases.len(), 1);
            let phase = graph.get(embed_phases[0].as_str()).and_then(Object::as_build_phase).unwrap();
            prop_assert_eq!(phase.files.len(), embedded.len());

            let linked = graph.get(PHASE).and_then(Object::as_build_phase).unwrap();
            prop_assert_eq!(linked.files.len(), count - embedded.len());
        }

        /// Property: the graph survives encode and decode unchanged after edits
        #[test]
        fn edited_graph_round_trips(count in 0usize..6, folder in "[A-Za-z]{1,12}") {
            let mut graph = graph_with_phase(PhaseKind::Resources, count);
            {
                let mut editor = editor(&mut graph);
                let data = editor.ensure_named_file_reference(&folder, Some(&folder), "SOURCE_ROOT", "folder").unwrap();
                editor.add_build_file_to_phase(&Identifier::new(PHASE), &data, false).unwrap();
                editor.find_or_create_embed_phase(&Identifier::new(TARGET)).unwrap();
            }
            let doc = ProjectDocument { objects: graph, ..Default::default() };
            let decoded = codec::decode(&codec::encode(&doc).unwrap()).unwrap();
            prop_assert_eq!(decoded.objects, doc.objects);
        }
    }
}
