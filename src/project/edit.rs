//! Graph mutation primitives
//!
//! An [`Editor`] holds the exclusive borrow of a graph for the length of one
//! patch run, together with the [`IdentifierSource`] new objects draw their
//! identifiers from.
//!
//! Every operation is idempotent: applying it twice with the same arguments
//! leaves the graph as applying it once did. Operations either complete or
//! return an error before touching the graph.

use log::{debug, info, warn};
use plist::Value;

use super::identifier::{Identifier, IdentifierSource, RandomIdentifiers};
use super::object::{
    AttributeSet, BuildFile, BuildFileSettings, BuildPhase, FileReference, Object, PhaseKind,
    EMBED_FRAMEWORKS_SUBFOLDER,
};
use super::query::Query;
use super::ObjectGraph;
use crate::error::{Error, Result};

/// `buildActionMask` of new phases: every build configuration.
pub const BUILD_ACTION_MASK_ALL: i64 = 2147483647;

pub const EMBED_FRAMEWORKS_PHASE_NAME: &str = "Embed Frameworks";

/// Attributes of a framework copied into the bundle.
pub const EMBED_ATTRIBUTES: [&str; 2] = ["CodeSignOnCopy", "RemoveHeadersOnCopy"];

/// Attribute making a header part of a framework's public interface.
pub const PUBLIC_ATTRIBUTE: &str = "Public";

/// Mutating view over an [`ObjectGraph`]
pub struct Editor<'a> {
    graph: &'a mut ObjectGraph,
    ids: Box<dyn IdentifierSource>,
}

impl<'a> Editor<'a> {
    /// Editor minting random identifiers.
    pub fn new(graph: &'a mut ObjectGraph) -> Self {
        Self::with_identifiers(graph, RandomIdentifiers)
    }

    pub fn with_identifiers(graph: &'a mut ObjectGraph, ids: impl IdentifierSource + 'static) -> Self {
        Self {
            graph,
            ids: Box::new(ids),
        }
    }

    pub fn graph(&self) -> &ObjectGraph {
        &*self.graph
    }

    fn insert_new(&mut self, object: Object) -> Result<Identifier> {
        let id = self.graph.allocate(self.ids.as_mut())?;
        self.graph.insert(id.clone(), object);
        Ok(id)
    }

    fn phase_mut(&mut self, id: &Identifier) -> Result<&mut BuildPhase> {
        self.graph
            .get_mut(id.as_str())
            .and_then(Object::as_build_phase_mut)
            .ok_or_else(|| Error::not_found(format!("build phase with identifier {}", id)))
    }

    /// The file reference for `path`, created if no file reference has that
    /// path yet.
    pub fn ensure_file_reference(
        &mut self,
        path: &str,
        source_tree: &str,
        file_type: &str,
    ) -> Result<Identifier> {
        self.ensure_named_file_reference(path, None, source_tree, file_type)
    }

    /// [`ensure_file_reference`](Self::ensure_file_reference) with a display
    /// name for newly created references.
    pub fn ensure_named_file_reference(
        &mut self,
        path: &str,
        name: Option<&str>,
        source_tree: &str,
        file_type: &str,
    ) -> Result<Identifier> {
        let query = Query::FileReferencePath(path.to_string());
        if let Some(existing) = self.graph.find_first(&query) {
            debug!("reusing file reference {} for {}", existing, path);
            return Ok(existing.clone());
        }

        let id = self.insert_new(Object::FileReference(FileReference {
            path: Some(path.to_string()),
            name: name.map(str::to_string),
            source_tree: Some(source_tree.to_string()),
            explicit_file_type: Some(file_type.to_string()),
            ..Default::default()
        }))?;
        info!("created file reference {} for {}", id, path);
        Ok(id)
    }

    /// The target's Embed Frameworks phase, appended to its phases if the
    /// target has none.
    pub fn find_or_create_embed_phase(&mut self, target: &Identifier) -> Result<Identifier> {
        let phases = self.graph.target(target.as_str())?.build_phases.clone();
        for phase_id in &phases {
            if self.graph.phase(phase_id, target)?.is_embed_frameworks() {
                debug!("target {} already has embed phase {}", target, phase_id);
                return Ok(phase_id.clone());
            }
        }

        let mut phase = BuildPhase::new(PhaseKind::CopyFiles);
        phase.dst_subfolder_spec = Some(EMBED_FRAMEWORKS_SUBFOLDER);
        phase.extra.insert(
            "buildActionMask".to_string(),
            Value::from(BUILD_ACTION_MASK_ALL),
        );
        phase.extra.insert("dstPath".to_string(), Value::from(""));
        phase
            .extra
            .insert("name".to_string(), Value::from(EMBED_FRAMEWORKS_PHASE_NAME));
        phase.extra.insert(
            "runOnlyForDeploymentPostprocessing".to_string(),
            Value::from(0_i64),
        );

        let id = self.insert_new(Object::BuildPhase(phase))?;
        if let Some(target) = self
            .graph
            .get_mut(target.as_str())
            .and_then(Object::as_native_target_mut)
        {
            target.build_phases.push(id.clone());
        }
        info!("created embed frameworks phase {} in target {}", id, target);
        Ok(id)
    }

    /// Add `file_ref` to `phase` through a new build file, unless a build
    /// file in the phase already references it. Returns the build file.
    ///
    /// With `embed`, the build file carries the code-sign and strip-headers
    /// attributes; otherwise its settings are empty.
    pub fn add_build_file_to_phase(
        &mut self,
        phase: &Identifier,
        file_ref: &Identifier,
        embed: bool,
    ) -> Result<Identifier> {
        self.phase_mut(phase)?;
        if !self.graph.contains(file_ref.as_str()) {
            return Err(Error::dangling(
                file_ref,
                format!("cannot add missing file reference to phase {}", phase),
            ));
        }
        if let Some(existing) = self.graph.phase_entries_for(phase, file_ref).into_iter().next() {
            debug!("phase {} already contains {} as {}", phase, file_ref, existing);
            return Ok(existing);
        }

        let settings = BuildFileSettings {
            attributes: embed.then(|| EMBED_ATTRIBUTES.into_iter().collect::<AttributeSet>()),
            ..Default::default()
        };
        let build_file = self.insert_new(Object::BuildFile(BuildFile {
            file_ref: Some(file_ref.clone()),
            settings: Some(settings),
            ..Default::default()
        }))?;
        self.phase_mut(phase)?.files.push(build_file.clone());
        info!(
            "added {} to phase {} as build file {}{}",
            file_ref,
            phase,
            build_file,
            if embed { " (embedded)" } else { "" }
        );
        Ok(build_file)
    }

    /// Drop every build file referencing `file_ref` from the target's phases
    /// of `kind`, deleting those build files from the graph. Returns how many
    /// build files were removed.
    pub fn remove_from_phases_by_kind(
        &mut self,
        target: &Identifier,
        file_ref: &Identifier,
        kind: PhaseKind,
    ) -> Result<usize> {
        let phases = self.graph.target(target.as_str())?.build_phases.clone();
        let mut matching = Vec::new();
        for phase_id in phases {
            if self.graph.phase(&phase_id, target)?.kind == kind {
                matching.push(phase_id);
            }
        }

        let mut removed = 0;
        for phase_id in matching {
            let doomed = self.graph.phase_entries_for(&phase_id, file_ref);
            if doomed.is_empty() {
                continue;
            }
            self.phase_mut(&phase_id)?
                .files
                .retain(|entry| !doomed.contains(entry));
            for build_file in doomed {
                if self.is_listed_in_any_phase(&build_file) {
                    warn!(
                        "build file {} is shared with another phase; keeping the object",
                        build_file
                    );
                    continue;
                }
                if self.graph.remove(build_file.as_str()).is_some() {
                    info!("removed build file {} from {} phase {}", build_file, kind, phase_id);
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn is_listed_in_any_phase(&self, build_file: &Identifier) -> bool {
        self.graph.iter().any(|(_, object)| {
            object
                .as_build_phase()
                .is_some_and(|phase| phase.files.contains(build_file))
        })
    }

    /// Mark the first header whose path contains `marker` as public.
    ///
    /// Only the first match (in identifier order) is changed. Its build
    /// file's attributes become exactly `{Public}`. Returns that build file.
    pub fn set_header_visibility_public(&mut self, marker: &str) -> Result<Identifier> {
        let header = self.graph.require(&Query::HeaderContaining(marker.to_string()))?;
        let build_file_id = self
            .graph
            .owning_build_file(&header)
            .cloned()
            .ok_or_else(|| Error::dangling(&header, "header has no build file"))?;

        let build_file = self
            .graph
            .get_mut(build_file_id.as_str())
            .and_then(Object::as_build_file_mut)
            .ok_or_else(|| Error::dangling(&build_file_id, "not a build file"))?;
        let settings = build_file.settings.get_or_insert_with(Default::default);
        settings.attributes = Some([PUBLIC_ATTRIBUTE].into_iter().collect());
        info!("header {} is now public via build file {}", header, build_file_id);
        Ok(build_file_id)
    }
}
