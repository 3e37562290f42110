//! Typed project objects
//!
//! Each entry of the descriptor's `objects` dictionary is decoded into an
//! [`Object`] keyed by its `isa`. Only the kinds the engine edits get their own
//! variant; everything else is carried as [`Object::Other`]. Every typed
//! struct keeps the keys it does not interpret in `extra`, so re-encoding an
//! untouched object reproduces its fields.

use std::fmt;
use std::str::FromStr;

use plist::{Dictionary, Value};

use super::identifier::Identifier;
use super::value::ValueExt;
use crate::error::{Error, Result};

pub const ISA_FILE_REFERENCE: &str = "PBXFileReference";
pub const ISA_BUILD_FILE: &str = "PBXBuildFile";
pub const ISA_NATIVE_TARGET: &str = "PBXNativeTarget";

/// `dstSubfolderSpec` value of a copy phase that installs into the bundle's
/// Frameworks directory.
pub const EMBED_FRAMEWORKS_SUBFOLDER: i64 = 10;

/// Kinds of build phase the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Sources,
    Frameworks,
    Resources,
    CopyFiles,
    Headers,
}

impl PhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            PhaseKind::Sources => "PBXSourcesBuildPhase",
            PhaseKind::Frameworks => "PBXFrameworksBuildPhase",
            PhaseKind::Resources => "PBXResourcesBuildPhase",
            PhaseKind::CopyFiles => "PBXCopyFilesBuildPhase",
            PhaseKind::Headers => "PBXHeadersBuildPhase",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        [
            PhaseKind::Sources,
            PhaseKind::Frameworks,
            PhaseKind::Resources,
            PhaseKind::CopyFiles,
            PhaseKind::Headers,
        ]
        .into_iter()
        .find(|kind| kind.isa() == isa)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Sources => "sources",
            PhaseKind::Frameworks => "frameworks",
            PhaseKind::Resources => "resources",
            PhaseKind::CopyFiles => "copy-files",
            PhaseKind::Headers => "headers",
        };
        f.write_str(name)
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sources" => Ok(PhaseKind::Sources),
            "frameworks" | "link" => Ok(PhaseKind::Frameworks),
            "resources" => Ok(PhaseKind::Resources),
            "copy-files" | "copyfiles" => Ok(PhaseKind::CopyFiles),
            "headers" => Ok(PhaseKind::Headers),
            _ => PhaseKind::from_isa(s).ok_or_else(|| format!("unknown build phase kind: {}", s)),
        }
    }
}

/// Ordered set of build-file attribute flags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeSet(Vec<String>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag. Returns false if it was already present.
    pub fn insert(&mut self, flag: impl Into<String>) -> bool {
        let flag = flag.into();
        if self.contains(&flag) {
            return false;
        }
        self.0.push(flag);
        true
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

/// A file or folder on disk
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileReference {
    pub path: Option<String>,
    pub name: Option<String>,
    pub source_tree: Option<String>,
    pub explicit_file_type: Option<String>,
    pub extra: Dictionary,
}

/// The `settings` dictionary of a build file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildFileSettings {
    pub attributes: Option<AttributeSet>,
    pub extra: Dictionary,
}

/// Inclusion of one file reference in one build phase
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildFile {
    pub file_ref: Option<Identifier>,
    pub settings: Option<BuildFileSettings>,
    pub extra: Dictionary,
}

impl BuildFile {
    pub fn attributes(&self) -> Option<&AttributeSet> {
        self.settings.as_ref().and_then(|s| s.attributes.as_ref())
    }
}

/// An ordered step of a target's build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPhase {
    pub kind: PhaseKind,
    pub files: Vec<Identifier>,
    pub dst_subfolder_spec: Option<i64>,
    pub extra: Dictionary,
}

impl BuildPhase {
    pub fn new(kind: PhaseKind) -> Self {
        Self {
            kind,
            files: Vec::new(),
            dst_subfolder_spec: None,
            extra: Dictionary::new(),
        }
    }

    pub fn is_embed_frameworks(&self) -> bool {
        self.kind == PhaseKind::CopyFiles
            && self.dst_subfolder_spec == Some(EMBED_FRAMEWORKS_SUBFOLDER)
    }

    /// Display name: the phase's `name` field when present, else its kind.
    pub fn label(&self) -> String {
        self.extra
            .get("name")
            .and_then(Value::as_string)
            .map(str::to_string)
            .unwrap_or_else(|| self.kind.to_string())
    }
}

/// A buildable target and its ordered phases
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeTarget {
    pub name: String,
    pub build_phases: Vec<Identifier>,
    pub extra: Dictionary,
}

/// One entry of the `objects` dictionary
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    FileReference(FileReference),
    BuildFile(BuildFile),
    BuildPhase(BuildPhase),
    NativeTarget(NativeTarget),
    /// Any kind the engine does not edit, kept verbatim (minus `isa`).
    Other { isa: String, fields: Dictionary },
}

impl Object {
    pub fn isa(&self) -> &str {
        match self {
            Object::FileReference(_) => ISA_FILE_REFERENCE,
            Object::BuildFile(_) => ISA_BUILD_FILE,
            Object::BuildPhase(phase) => phase.kind.isa(),
            Object::NativeTarget(_) => ISA_NATIVE_TARGET,
            Object::Other { isa, .. } => isa,
        }
    }

    pub fn as_file_reference(&self) -> Option<&FileReference> {
        match self {
            Object::FileReference(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_build_file(&self) -> Option<&BuildFile> {
        match self {
            Object::BuildFile(build_file) => Some(build_file),
            _ => None,
        }
    }

    pub fn as_build_file_mut(&mut self) -> Option<&mut BuildFile> {
        match self {
            Object::BuildFile(build_file) => Some(build_file),
            _ => None,
        }
    }

    pub fn as_build_phase(&self) -> Option<&BuildPhase> {
        match self {
            Object::BuildPhase(phase) => Some(phase),
            _ => None,
        }
    }

    pub fn as_build_phase_mut(&mut self) -> Option<&mut BuildPhase> {
        match self {
            Object::BuildPhase(phase) => Some(phase),
            _ => None,
        }
    }

    pub fn as_native_target(&self) -> Option<&NativeTarget> {
        match self {
            Object::NativeTarget(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_native_target_mut(&mut self) -> Option<&mut NativeTarget> {
        match self {
            Object::NativeTarget(target) => Some(target),
            _ => None,
        }
    }

    /// Identifiers this object points at through the fields the engine
    /// interprets (`buildPhases`, `files`, `fileRef`).
    pub fn references(&self) -> Vec<&Identifier> {
        match self {
            Object::NativeTarget(target) => target.build_phases.iter().collect(),
            Object::BuildPhase(phase) => phase.files.iter().collect(),
            Object::BuildFile(build_file) => build_file.file_ref.iter().collect(),
            Object::FileReference(_) | Object::Other { .. } => Vec::new(),
        }
    }

    /// Decode one `objects` entry.
    pub fn from_dictionary(id: &Identifier, mut dict: Dictionary) -> Result<Self> {
        let isa = match dict.remove("isa") {
            Some(Value::String(isa)) => isa,
            Some(other) => {
                return Err(Error::format(format!(
                    "object {} has an isa of type {}",
                    id,
                    other.kind()
                )))
            }
            None => return Err(Error::format(format!("object {} has no isa", id))),
        };

        let object = if isa == ISA_FILE_REFERENCE {
            Object::FileReference(FileReference {
                path: take_string(&mut dict, "path", id)?,
                name: take_string(&mut dict, "name", id)?,
                source_tree: take_string(&mut dict, "sourceTree", id)?,
                explicit_file_type: take_string(&mut dict, "explicitFileType", id)?,
                extra: dict,
            })
        } else if isa == ISA_BUILD_FILE {
            let file_ref = take_string(&mut dict, "fileRef", id)?.map(Identifier::new);
            let settings = match dict.remove("settings") {
                Some(Value::Dictionary(mut settings)) => Some(BuildFileSettings {
                    attributes: take_string_list(&mut settings, "ATTRIBUTES", id)?
                        .map(AttributeSet::from_iter),
                    extra: settings,
                }),
                Some(other) => {
                    return Err(Error::format(format!(
                        "build file {} has settings of type {}",
                        id,
                        other.kind()
                    )))
                }
                None => None,
            };
            Object::BuildFile(BuildFile {
                file_ref,
                settings,
                extra: dict,
            })
        } else if let Some(kind) = PhaseKind::from_isa(&isa) {
            let files = take_id_list(&mut dict, "files", id)?;
            let dst_subfolder_spec = match dict.get("dstSubfolderSpec").and_then(ValueExt::as_integer)
            {
                Some(code) => {
                    dict.remove("dstSubfolderSpec");
                    Some(code)
                }
                None => None,
            };
            Object::BuildPhase(BuildPhase {
                kind,
                files,
                dst_subfolder_spec,
                extra: dict,
            })
        } else if isa == ISA_NATIVE_TARGET {
            let name = take_string(&mut dict, "name", id)?
                .ok_or_else(|| Error::format(format!("native target {} has no name", id)))?;
            Object::NativeTarget(NativeTarget {
                name,
                build_phases: take_id_list(&mut dict, "buildPhases", id)?,
                extra: dict,
            })
        } else {
            Object::Other { isa, fields: dict }
        };
        Ok(object)
    }

    /// Encode back into an `objects` entry, `isa` included.
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict;
        match self {
            Object::FileReference(file) => {
                dict = file.extra.clone();
                put_string(&mut dict, "path", &file.path);
                put_string(&mut dict, "name", &file.name);
                put_string(&mut dict, "sourceTree", &file.source_tree);
                put_string(&mut dict, "explicitFileType", &file.explicit_file_type);
            }
            Object::BuildFile(build_file) => {
                dict = build_file.extra.clone();
                if let Some(file_ref) = &build_file.file_ref {
                    dict.insert("fileRef".to_string(), Value::from(file_ref.to_string()));
                }
                if let Some(settings) = &build_file.settings {
                    let mut encoded = settings.extra.clone();
                    if let Some(attributes) = &settings.attributes {
                        encoded.insert(
                            "ATTRIBUTES".to_string(),
                            Value::Array(attributes.iter().map(Value::from).collect()),
                        );
                    }
                    dict.insert("settings".to_string(), Value::Dictionary(encoded));
                }
            }
            Object::BuildPhase(phase) => {
                dict = phase.extra.clone();
                dict.insert("files".to_string(), id_list(&phase.files));
                if let Some(code) = phase.dst_subfolder_spec {
                    dict.insert("dstSubfolderSpec".to_string(), Value::from(code));
                }
            }
            Object::NativeTarget(target) => {
                dict = target.extra.clone();
                dict.insert("name".to_string(), Value::from(target.name.clone()));
                dict.insert("buildPhases".to_string(), id_list(&target.build_phases));
            }
            Object::Other { fields, .. } => dict = fields.clone(),
        }
        dict.insert("isa".to_string(), Value::from(self.isa()));
        dict
    }
}

/// A string field. A bare numeric word in the text form (`name = 2048;`)
/// decodes as an integer and is read back as its digits.
fn take_string(dict: &mut Dictionary, key: &str, id: &Identifier) -> Result<Option<String>> {
    match dict.remove(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Integer(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(Error::format(format!(
            "object {}: {} should be a string, found {}",
            id,
            key,
            other.kind()
        ))),
        None => Ok(None),
    }
}

fn take_string_list(dict: &mut Dictionary, key: &str, id: &Identifier) -> Result<Option<Vec<String>>> {
    let items = match dict.remove(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::format(format!(
                "object {}: {} should be an array, found {}",
                id,
                key,
                other.kind()
            )))
        }
        None => return Ok(None),
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(Error::format(format!(
                "object {}: {} should only hold strings, found {}",
                id,
                key,
                other.kind()
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn take_id_list(dict: &mut Dictionary, key: &str, id: &Identifier) -> Result<Vec<Identifier>> {
    Ok(take_string_list(dict, key, id)?
        .unwrap_or_default()
        .into_iter()
        .map(Identifier::new)
        .collect())
}

fn put_string(dict: &mut Dictionary, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        dict.insert(key.to_string(), Value::from(value.clone()));
    }
}

fn id_list(ids: &[Identifier]) -> Value {
    Value::Array(ids.iter().map(|id| Value::from(id.to_string())).collect())
}
