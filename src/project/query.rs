//! Graph queries
//!
//! Every search scans the graph in identifier order (see the module docs of
//! [`crate::project`]), so "the first match" is well defined. Queries are
//! values of [`Query`]; their `Display` text is what a `NotFound` error
//! reports.

use std::fmt;

use super::identifier::Identifier;
use super::object::{Object, PhaseKind};
use super::ObjectGraph;
use crate::error::{Error, Result};

/// Target names containing any of these (case-insensitive) are not the
/// mobile application target.
pub const NON_APP_TARGET_MARKERS: [&str; 3] = ["desktop", "test", "mac"];

/// Header file suffix matched by [`Query::HeaderContaining`].
pub const HEADER_SUFFIX: &str = ".h";

/// A predicate over graph objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// A file reference whose `path` equals the given path.
    FileReferencePath(String),
    /// A native target with exactly this name.
    NativeTargetName(String),
    /// The first native target that is neither a desktop, test nor mac target.
    AppTarget,
    /// A copy-files phase installing into the Frameworks directory.
    EmbedFrameworksPhase,
    /// A header file reference whose path contains the marker.
    HeaderContaining(String),
}

impl Query {
    pub fn matches(&self, object: &Object) -> bool {
        match (self, object) {
            (Query::FileReferencePath(path), Object::FileReference(file)) => {
                file.path.as_deref() == Some(path.as_str())
            }
            (Query::NativeTargetName(name), Object::NativeTarget(target)) => target.name == *name,
            (Query::AppTarget, Object::NativeTarget(target)) => {
                let lower = target.name.to_lowercase();
                !NON_APP_TARGET_MARKERS
                    .iter()
                    .any(|marker| lower.contains(marker))
            }
            (Query::EmbedFrameworksPhase, Object::BuildPhase(phase)) => phase.is_embed_frameworks(),
            (Query::HeaderContaining(marker), Object::FileReference(file)) => file
                .path
                .as_deref()
                .is_some_and(|path| path.ends_with(HEADER_SUFFIX) && path.contains(marker.as_str())),
            _ => false,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::FileReferencePath(path) => write!(f, "file reference with path {:?}", path),
            Query::NativeTargetName(name) => write!(f, "native target named {:?}", name),
            Query::AppTarget => write!(
                f,
                "native target whose name contains none of {}",
                NON_APP_TARGET_MARKERS.join(", ")
            ),
            Query::EmbedFrameworksPhase => write!(f, "Embed Frameworks copy phase"),
            Query::HeaderContaining(marker) => {
                write!(f, "header file reference with {:?} in its path", marker)
            }
        }
    }
}

/// One identifier that does not resolve, and the object pointing at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub owner: Identifier,
    pub missing: Identifier,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references missing object {}", self.owner, self.missing)
    }
}

impl ObjectGraph {
    /// First object (in identifier order) satisfying `query`.
    pub fn find_first(&self, query: &Query) -> Option<&Identifier> {
        self.iter()
            .find(|(_, object)| query.matches(object))
            .map(|(id, _)| id)
    }

    /// Like [`find_first`](Self::find_first), failing with `NotFound`.
    pub fn require(&self, query: &Query) -> Result<Identifier> {
        self.find_first(query)
            .cloned()
            .ok_or_else(|| Error::not_found(query))
    }

    /// Every object satisfying `query`, in identifier order.
    pub fn find_all<'a>(&'a self, query: &'a Query) -> impl Iterator<Item = &'a Identifier> + 'a {
        self.iter()
            .filter(move |(_, object)| query.matches(object))
            .map(|(id, _)| id)
    }

    /// First build file (in identifier order) whose `fileRef` is `file_ref`.
    pub fn owning_build_file(&self, file_ref: &Identifier) -> Option<&Identifier> {
        self.iter()
            .find(|(_, object)| {
                object
                    .as_build_file()
                    .is_some_and(|build_file| build_file.file_ref.as_ref() == Some(file_ref))
            })
            .map(|(id, _)| id)
    }

    /// First phase of `kind` in the target's own phase order.
    pub fn target_phase(&self, target: &Identifier, kind: PhaseKind) -> Result<Option<Identifier>> {
        for phase_id in &self.target(target.as_str())?.build_phases {
            if self.phase(phase_id, target)?.kind == kind {
                return Ok(Some(phase_id.clone()));
            }
        }
        Ok(None)
    }

    /// Build files in `phase` that reference `file_ref`.
    pub fn phase_entries_for(&self, phase: &Identifier, file_ref: &Identifier) -> Vec<Identifier> {
        let Some(phase) = self.get(phase.as_str()).and_then(Object::as_build_phase) else {
            return Vec::new();
        };
        phase
            .files
            .iter()
            .filter(|id| {
                self.get(id.as_str())
                    .and_then(Object::as_build_file)
                    .is_some_and(|build_file| build_file.file_ref.as_ref() == Some(file_ref))
            })
            .cloned()
            .collect()
    }

    /// Every reference through `buildPhases`, `files` or `fileRef` that does
    /// not resolve to an object.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for (owner, object) in self.iter() {
            for reference in object.references() {
                if !self.contains(reference.as_str()) {
                    dangling.push(DanglingReference {
                        owner: owner.clone(),
                        missing: reference.clone(),
                    });
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::*;
    use crate::project::object::BuildPhase;

    #[test]
    fn test_find_file_reference_by_path() {
        let graph = unity_link_graph();
        let query = Query::FileReferencePath("UnityFramework.framework".to_string());
        assert_eq!(graph.find_first(&query).unwrap().as_str(), FRAMEWORK_REF);

        let missing = Query::FileReferencePath("Missing.framework".to_string());
        assert!(graph.find_first(&missing).is_none());
    }

    #[test]
    fn test_app_target_skips_mac_targets() {
        let graph = unity_link_graph();
        // The mac target sorts first but is excluded by name.
        assert_eq!(graph.require(&Query::AppTarget).unwrap().as_str(), APP_TARGET);
    }

    #[test]
    fn test_app_target_markers_are_case_insensitive() {
        let graph: ObjectGraph = [
            ("01", target("GameTests", &[])),
            ("02", target("Game-Desktop", &[])),
            ("03", target("GameMAC", &[])),
        ]
        .into_iter()
        .map(|(id, object)| (Identifier::new(id), object))
        .collect();

        let err = graph.require(&Query::AppTarget).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.to_string().contains("desktop, test, mac"));
    }

    #[test]
    fn test_first_match_follows_identifier_order() {
        let graph: ObjectGraph = [
            ("B", target("Second", &[])),
            ("A", target("First", &[])),
        ]
        .into_iter()
        .map(|(id, object)| (Identifier::new(id), object))
        .collect();

        assert_eq!(graph.find_first(&Query::AppTarget).unwrap().as_str(), "A");
    }

    #[test]
    fn test_embed_phase_requires_subfolder_code() {
        let mut plain = BuildPhase::new(PhaseKind::CopyFiles);
        plain.dst_subfolder_spec = Some(7);
        let mut embed = BuildPhase::new(PhaseKind::CopyFiles);
        embed.dst_subfolder_spec = Some(10);

        assert!(!Query::EmbedFrameworksPhase.matches(&Object::BuildPhase(plain)));
        assert!(Query::EmbedFrameworksPhase.matches(&Object::BuildPhase(embed)));
    }

    #[test]
    fn test_header_query() {
        let query = Query::HeaderContaining("Libraries/Plugins/iOS".to_string());
        assert!(query.matches(&file_reference("Libraries/Plugins/iOS/Bridge.h")));
        assert!(!query.matches(&file_reference("Libraries/Plugins/iOS/Bridge.mm")));
        assert!(!query.matches(&file_reference("Classes/Bridge.h")));
    }

    #[test]
    fn test_owning_build_file() {
        let graph = unity_link_graph();
        let owner = graph.owning_build_file(&Identifier::new(FRAMEWORK_REF));
        assert_eq!(owner.unwrap().as_str(), FRAMEWORK_LINK);
        assert!(graph
            .owning_build_file(&Identifier::new(LINK_PHASE))
            .is_none());
    }

    #[test]
    fn test_target_phase_uses_target_order() {
        let graph = unity_link_graph();
        let target = Identifier::new(APP_TARGET);
        assert_eq!(
            graph.target_phase(&target, PhaseKind::Frameworks).unwrap(),
            Some(Identifier::new(LINK_PHASE))
        );
        assert_eq!(graph.target_phase(&target, PhaseKind::Resources).unwrap(), None);
    }

    #[test]
    fn test_dangling_references() {
        let mut graph = unity_link_graph();
        assert!(graph.dangling_references().is_empty());

        graph.remove(OTHER_REF);
        graph.remove(SOURCES_PHASE);
        let dangling = graph.dangling_references();
        assert_eq!(
            dangling,
            vec![
                DanglingReference {
                    owner: Identifier::new(APP_TARGET),
                    missing: Identifier::new(SOURCES_PHASE),
                },
                DanglingReference {
                    owner: Identifier::new(OTHER_LINK),
                    missing: Identifier::new(OTHER_REF),
                },
            ]
        );
    }
}
