//! # pbxpatch Library
//!
//! Reads an Xcode `project.pbxproj` descriptor into a typed object graph,
//! applies idempotent patches to it, and writes it back as an XML property
//! list. The `pbxpatch` binary is a thin wrapper over this crate.
//!
//! ## Quick Example
//!
//! ```
//! use pbxpatch::patches;
//! use pbxpatch::project::codec;
//! use pbxpatch::project::edit::Editor;
//!
//! let descriptor = r#"{
//!     objects = {
//!         F1 = { isa = PBXFileReference; path = UnityFramework.framework; sourceTree = SOURCE_ROOT; };
//!         B1 = { isa = PBXBuildFile; fileRef = F1; };
//!         L1 = { isa = PBXFrameworksBuildPhase; files = ( B1 ); };
//!         T1 = { isa = PBXNativeTarget; name = Game; buildPhases = ( L1 ); };
//!     };
//! }"#;
//!
//! let mut doc = codec::decode(descriptor.as_bytes()).unwrap();
//! let outcome = patches::embed_framework(
//!     &mut Editor::new(&mut doc.objects),
//!     "UnityFramework.framework",
//!     None,
//!     false,
//! )
//! .unwrap();
//! assert_eq!(outcome.unlinked, 1);
//! assert!(doc.objects.dangling_references().is_empty());
//!
//! let xml = codec::encode(&doc).unwrap();
//! assert!(xml.starts_with(b"<?xml"));
//! ```
//!
//! ## Modules
//!
//! - **`project`**: the typed object graph, its property-list codec, queries
//!   and the mutation primitives.
//! - **`patches`**: named changes composed from the primitives (embed a
//!   framework, move a resource, publish a header).
//! - **`config`** / **`runner`**: the `.pbxpatch.yaml` recipe and its
//!   execution as one run.
//! - **`workspace`**, **`textpatch`**, **`filesystem`**, **`buildlog`**: the
//!   host-file steps that accompany descriptor patches.
//! - **`output`**: terminal styling for the binary.

pub mod buildlog;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod output;
pub mod patches;
pub mod project;
pub mod runner;
pub mod textpatch;
pub mod workspace;

#[cfg(test)]
mod graph_proptest;
