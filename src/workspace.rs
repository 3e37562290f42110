//! # Workspace Files
//!
//! An `.xcworkspace` bundle lists its member projects in
//! `contents.xcworkspacedata`:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Workspace
//!    version = "1.0">
//!    <FileRef
//!       location = "absolute:/builds/Game/Unity-iPhone.xcodeproj">
//!    </FileRef>
//! </Workspace>
//! ```
//!
//! This module reads that file into a [`Workspace`], adds or rewrites
//! `FileRef` locations, and writes it back with the XML declaration and
//! three-space indentation.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use walkdir::WalkDir;
use xot::{Node, Xot};

use crate::error::{Error, Result};
use crate::project::codec::write_atomic;

/// File inside an `.xcworkspace` bundle holding its contents.
pub const CONTENTS_FILE: &str = "contents.xcworkspacedata";

pub const WORKSPACE_EXTENSION: &str = "xcworkspace";

/// Build-root directory names rewritten by [`Workspace::relativize`] when no
/// roots are configured.
pub const DEFAULT_BUILD_ROOTS: [&str; 2] = ["UnityBuild", "CocosBuild"];

const ABSOLUTE_PREFIX: &str = "absolute:";
const CONTAINER_PREFIX: &str = "container:";

/// One child of a workspace or group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    FileRef {
        location: String,
    },
    Group {
        location: Option<String>,
        name: Option<String>,
        entries: Vec<Entry>,
    },
}

/// Parsed `contents.xcworkspacedata`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub version: String,
    pub entries: Vec<Entry>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            entries: Vec::new(),
        }
    }
}

fn workspace_error(message: impl Into<String>) -> Error {
    Error::Workspace {
        message: message.into(),
    }
}

impl Workspace {
    /// A workspace referencing each of `locations` in order.
    pub fn with_locations<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: locations
                .into_iter()
                .map(|location| Entry::FileRef {
                    location: location.into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let names = Names::register(&mut xot);
        let doc = xot
            .parse(text)
            .map_err(|e| workspace_error(format!("invalid XML: {:?}", e)))?;
        let root = xot
            .document_element(doc)
            .map_err(|e| workspace_error(format!("invalid XML: {:?}", e)))?;

        let reader = TreeReader { xot: &xot, names };
        if reader.name_of(root) != Some(reader.names.workspace) {
            return Err(workspace_error("root element is not <Workspace>"));
        }
        Ok(Self {
            version: reader
                .attribute(root, reader.names.version)
                .unwrap_or_else(|| "1.0".to_string()),
            entries: reader.read_entries(root)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| match e {
            Error::Workspace { message } => {
                workspace_error(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 3);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("Workspace");
        root.push_attribute(("version", self.version.as_str()));
        writer.write_event(Event::Start(root))?;
        write_entries(&mut writer, &self.entries)?;
        writer.write_event(Event::End(BytesEnd::new("Workspace")))?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes()?)?;
        info!("wrote workspace {}", path.display());
        Ok(())
    }

    /// Every `FileRef` location, groups included, in document order.
    pub fn locations(&self) -> Vec<&str> {
        fn collect<'a>(entries: &'a [Entry], out: &mut Vec<&'a str>) {
            for entry in entries {
                match entry {
                    Entry::FileRef { location } => out.push(location),
                    Entry::Group { entries, .. } => collect(entries, out),
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.entries, &mut out);
        out
    }

    /// Append a top-level `FileRef` unless one with `location` exists
    /// anywhere in the workspace. Returns whether it was added.
    pub fn ensure_file_ref(&mut self, location: &str) -> bool {
        if self.locations().contains(&location) {
            debug!("workspace already references {}", location);
            return false;
        }
        self.entries.push(Entry::FileRef {
            location: location.to_string(),
        });
        info!("added {} to workspace", location);
        true
    }

    /// Rewrite `absolute:` locations under one of `roots` to
    /// `container:../<rest>`. Returns how many locations changed.
    pub fn relativize<S: AsRef<str>>(&mut self, roots: &[S]) -> usize {
        fn visit<S: AsRef<str>>(entries: &mut [Entry], roots: &[S]) -> usize {
            let mut changed = 0;
            for entry in entries {
                match entry {
                    Entry::FileRef { location } => {
                        if let Some(relative) = relative_location(location, roots) {
                            debug!("{} -> {}", location, relative);
                            *location = relative;
                            changed += 1;
                        }
                    }
                    Entry::Group { entries, .. } => changed += visit(entries, roots),
                }
            }
            changed
        }
        visit(&mut self.entries, roots)
    }
}

fn relative_location<S: AsRef<str>>(location: &str, roots: &[S]) -> Option<String> {
    let path = location.strip_prefix(ABSOLUTE_PREFIX)?;
    roots.iter().find_map(|root| {
        let marker = format!("/{}/", root.as_ref());
        path.split_once(marker.as_str())
            .map(|(_, rest)| format!("{}../{}", CONTAINER_PREFIX, rest))
    })
}

fn write_entries(writer: &mut Writer<Vec<u8>>, entries: &[Entry]) -> Result<()> {
    for entry in entries {
        match entry {
            Entry::FileRef { location } => {
                let mut start = BytesStart::new("FileRef");
                start.push_attribute(("location", location.as_str()));
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::End(BytesEnd::new("FileRef")))?;
            }
            Entry::Group {
                location,
                name,
                entries,
            } => {
                let mut start = BytesStart::new("Group");
                if let Some(location) = location {
                    start.push_attribute(("location", location.as_str()));
                }
                if let Some(name) = name {
                    start.push_attribute(("name", name.as_str()));
                }
                writer.write_event(Event::Start(start))?;
                write_entries(writer, entries)?;
                writer.write_event(Event::End(BytesEnd::new("Group")))?;
            }
        }
    }
    Ok(())
}

struct Names {
    workspace: xot::NameId,
    file_ref: xot::NameId,
    group: xot::NameId,
    version: xot::NameId,
    location: xot::NameId,
    name: xot::NameId,
}

impl Names {
    fn register(xot: &mut Xot) -> Self {
        Self {
            workspace: xot.add_name("Workspace"),
            file_ref: xot.add_name("FileRef"),
            group: xot.add_name("Group"),
            version: xot.add_name("version"),
            location: xot.add_name("location"),
            name: xot.add_name("name"),
        }
    }
}

struct TreeReader<'a> {
    xot: &'a Xot,
    names: Names,
}

impl TreeReader<'_> {
    fn name_of(&self, node: Node) -> Option<xot::NameId> {
        self.xot.element(node).map(|element| element.name())
    }

    fn attribute(&self, node: Node, name: xot::NameId) -> Option<String> {
        self.xot.attributes(node).get(name).cloned()
    }

    fn read_entries(&self, node: Node) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for child in self.xot.children(node) {
            let Some(name) = self.name_of(child) else {
                continue;
            };
            if name == self.names.file_ref {
                let location = self
                    .attribute(child, self.names.location)
                    .ok_or_else(|| workspace_error("<FileRef> without a location"))?;
                entries.push(Entry::FileRef { location });
            } else if name == self.names.group {
                entries.push(Entry::Group {
                    location: self.attribute(child, self.names.location),
                    name: self.attribute(child, self.names.name),
                    entries: self.read_entries(child)?,
                });
            } else {
                debug!("skipping unknown workspace element");
            }
        }
        Ok(entries)
    }
}

/// `absolute:<path>` for `path`, made absolute against the working directory.
pub fn absolute_location(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    Ok(format!("{}{}", ABSOLUTE_PREFIX, absolute.display()))
}

/// The contents file of the first `.xcworkspace` bundle found under `dir`.
pub fn find_workspace(dir: &Path) -> Result<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_dir()
                && entry.path().extension().is_some_and(|ext| ext == WORKSPACE_EXTENSION)
        })
        .map(|entry| entry.path().join(CONTENTS_FILE))
        .ok_or_else(|| Error::not_found(format!("*.{} under {}", WORKSPACE_EXTENSION, dir.display())))
}

/// Workspace name derived from a product name: its alphanumeric characters
/// followed by `WS`.
pub fn workspace_name(product: &str) -> String {
    let mut name: String = product.chars().filter(|c| c.is_alphanumeric()).collect();
    name.push_str("WS");
    name
}

/// Path of the contents file for workspace `name` inside `dir`.
pub fn contents_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, WORKSPACE_EXTENSION))
        .join(CONTENTS_FILE)
}

/// Create (or overwrite) a workspace listing `projects` by absolute path.
pub fn create(contents: &Path, projects: &[PathBuf]) -> Result<Workspace> {
    let locations = projects
        .iter()
        .map(|project| {
            if !project.is_dir() {
                return Err(Error::not_found(format!("project bundle {}", project.display())));
            }
            absolute_location(project)
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(parent) = contents.parent() {
        fs::create_dir_all(parent)?;
    }
    let workspace = Workspace::with_locations(locations);
    workspace.save(contents)?;
    Ok(workspace)
}
