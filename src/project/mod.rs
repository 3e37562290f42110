//! # Project Object Graph
//!
//! A decoded `project.pbxproj` is a [`ProjectDocument`]: a handful of
//! top-level fields plus the [`ObjectGraph`], the mapping from identifier to
//! typed [`Object`].
//!
//! ## Layout
//!
//! - [`identifier`]: identifiers and the sources that mint new ones
//! - [`object`]: typed objects (file references, build files, phases, targets)
//! - [`codec`]: bytes ↔ document, and the atomic on-disk replace
//! - [`query`]: predicate search over the graph
//! - [`edit`]: the mutation primitives
//! - [`value`]: coercions over untyped property-list scalars
//!
//! ## Ordering
//!
//! Objects are stored in a `BTreeMap`, so iteration is in lexicographic
//! identifier order. Every "first match" query scans in that order, which
//! makes the outcome of a query a function of the file's contents alone.
//!
//! ## Invariants
//!
//! After every mutation performed through [`edit::Editor`]:
//!
//! 1. every identifier in a `buildPhases` or `files` list is a key of the graph;
//! 2. at most one file reference exists per path created through the editor;
//! 3. a build file dropped from a phase is also removed from the graph;
//! 4. untouched entries of a phase's `files` keep their relative order.

pub mod codec;
pub mod edit;
pub mod identifier;
pub mod object;
pub mod query;
pub mod value;

use std::collections::BTreeMap;

use plist::Dictionary;

use crate::error::{Error, Result};
use value::ValueExt;
pub use identifier::{Identifier, IdentifierSource, RandomIdentifiers, SequentialIdentifiers};
pub use object::{
    AttributeSet, BuildFile, BuildFileSettings, BuildPhase, FileReference, NativeTarget, Object,
    PhaseKind,
};

/// Identifier → object mapping, iterated in identifier order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectGraph {
    objects: BTreeMap<Identifier, Object>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn insert(&mut self, id: Identifier, object: Object) -> Option<Object> {
        self.objects.insert(id, object)
    }

    pub fn remove(&mut self, id: &str) -> Option<Object> {
        self.objects.remove(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Object)> {
        self.objects.iter()
    }

    /// Draw identifiers from `source` until one is not already a key.
    pub fn allocate(&self, source: &mut dyn IdentifierSource) -> Result<Identifier> {
        loop {
            let candidate = source.candidate()?;
            if !self.contains(candidate.as_str()) {
                return Ok(candidate);
            }
            log::debug!("identifier {} already taken, drawing another", candidate);
        }
    }

    /// The native target `id`, or `NotFound` if there is no such target.
    pub fn target(&self, id: &str) -> Result<&NativeTarget> {
        self.get(id)
            .and_then(Object::as_native_target)
            .ok_or_else(|| Error::not_found(format!("native target with identifier {}", id)))
    }

    /// The build phase `id` as referenced from `owner`.
    ///
    /// A missing phase is a dangling reference, since `id` came from the
    /// owner's `buildPhases` list.
    pub fn phase(&self, id: &Identifier, owner: &Identifier) -> Result<&BuildPhase> {
        match self.get(id.as_str()) {
            Some(Object::BuildPhase(phase)) => Ok(phase),
            Some(_) => Err(Error::dangling(
                id,
                format!("listed as a build phase of {} but is not one", owner),
            )),
            None => Err(Error::dangling(
                id,
                format!("listed in buildPhases of {} but missing from objects", owner),
            )),
        }
    }
}

impl FromIterator<(Identifier, Object)> for ObjectGraph {
    fn from_iter<I: IntoIterator<Item = (Identifier, Object)>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

/// A decoded project descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectDocument {
    pub objects: ObjectGraph,
    pub root_object: Option<Identifier>,
    /// Every other top-level key (`archiveVersion`, `classes`,
    /// `objectVersion`, ...), written back unchanged.
    pub top_level: Dictionary,
}

impl ProjectDocument {
    /// The `objectVersion` format tag, if present and numeric.
    pub fn object_version(&self) -> Option<i64> {
        self.top_level
            .get("objectVersion")
            .and_then(ValueExt::as_integer)
    }

    /// Native targets in identifier order.
    pub fn targets(&self) -> impl Iterator<Item = (&Identifier, &NativeTarget)> {
        self.objects
            .iter()
            .filter_map(|(id, object)| object.as_native_target().map(|target| (id, target)))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small graphs shared by the unit tests of the query and edit layers.

    use super::*;

    pub const FRAMEWORK_REF: &str = "A00000000000000000000001";
    pub const FRAMEWORK_LINK: &str = "A00000000000000000000002";
    pub const LINK_PHASE: &str = "A00000000000000000000003";
    pub const SOURCES_PHASE: &str = "A00000000000000000000004";
    pub const APP_TARGET: &str = "A00000000000000000000005";
    pub const OTHER_LINK: &str = "A00000000000000000000006";
    pub const OTHER_REF: &str = "A00000000000000000000007";
    pub const MAC_TARGET: &str = "A00000000000000000000000";

    pub fn file_reference(path: &str) -> Object {
        Object::FileReference(FileReference {
            path: Some(path.to_string()),
            source_tree: Some("SOURCE_ROOT".to_string()),
            ..Default::default()
        })
    }

    pub fn build_file(file_ref: &str) -> Object {
        Object::BuildFile(BuildFile {
            file_ref: Some(Identifier::new(file_ref)),
            ..Default::default()
        })
    }

    pub fn phase(kind: PhaseKind, files: &[&str]) -> Object {
        let mut phase = BuildPhase::new(kind);
        phase.files = files.iter().map(|f| Identifier::new(*f)).collect();
        Object::BuildPhase(phase)
    }

    pub fn target(name: &str, phases: &[&str]) -> Object {
        Object::NativeTarget(NativeTarget {
            name: name.to_string(),
            build_phases: phases.iter().map(|p| Identifier::new(*p)).collect(),
            ..Default::default()
        })
    }

    /// One app target linking `UnityFramework.framework` (plus one other
    /// library) with no embed phase, and a macOS target sorting first.
    pub fn unity_link_graph() -> ObjectGraph {
        [
            (MAC_TARGET, target("MyGame-mac", &[])),
            (FRAMEWORK_REF, file_reference("UnityFramework.framework")),
            (FRAMEWORK_LINK, build_file(FRAMEWORK_REF)),
            (LINK_PHASE, phase(PhaseKind::Frameworks, &[OTHER_LINK, FRAMEWORK_LINK])),
            (SOURCES_PHASE, phase(PhaseKind::Sources, &[])),
            (APP_TARGET, target("MyGame-mobile", &[SOURCES_PHASE, LINK_PHASE])),
            (OTHER_LINK, build_file(OTHER_REF)),
            (OTHER_REF, file_reference("libz.tbd")),
        ]
        .into_iter()
        .map(|(id, object)| (Identifier::new(id), object))
        .collect()
    }
}
