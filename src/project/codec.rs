//! Descriptor codec
//!
//! [`decode`] accepts every on-disk form of `project.pbxproj` (OpenStep text,
//! XML or binary property list) and builds a [`ProjectDocument`]. [`encode`]
//! always writes the XML property-list form, with dictionary keys sorted so
//! the output depends only on the graph.
//!
//! [`save`] writes to a temporary file next to the destination and renames it
//! over the original, so a failure mid-write never leaves a truncated
//! descriptor behind.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use plist::{Dictionary, Value};

use super::identifier::Identifier;
use super::object::Object;
use super::value::{self, ValueExt};
use super::{ObjectGraph, ProjectDocument};
use crate::error::{Error, Result};

/// Decode descriptor bytes into a document.
pub fn decode(bytes: &[u8]) -> Result<ProjectDocument> {
    let mut top_level = Value::from_reader(Cursor::new(bytes))?
        .into_dictionary()
        .ok_or_else(|| Error::format("top-level value is not a dictionary"))?;

    let raw_objects = match top_level.remove("objects") {
        Some(Value::Dictionary(objects)) => objects,
        Some(other) => {
            return Err(Error::format(format!(
                "objects should be a dictionary, found {}",
                other.kind()
            )))
        }
        None => return Err(Error::format("missing top-level objects field")),
    };

    let objects = raw_objects
        .into_iter()
        .map(|(key, value)| {
            let id = Identifier::new(key);
            let fields = value.into_dictionary().ok_or_else(|| {
                Error::format(format!("object {} is not a dictionary", id))
            })?;
            let object = Object::from_dictionary(&id, fields)?;
            Ok((id, object))
        })
        .collect::<Result<ObjectGraph>>()?;

    let root_object = match top_level.remove("rootObject") {
        Some(Value::String(id)) => Some(Identifier::new(id)),
        Some(other) => {
            return Err(Error::format(format!(
                "rootObject should be a string, found {}",
                other.kind()
            )))
        }
        None => None,
    };

    Ok(ProjectDocument {
        objects,
        root_object,
        top_level,
    })
}

/// Encode a document as an XML property list.
pub fn encode(doc: &ProjectDocument) -> Result<Vec<u8>> {
    let mut top_level = doc.top_level.clone();
    let objects: Dictionary = doc
        .objects
        .iter()
        .map(|(id, object)| (id.to_string(), Value::Dictionary(object.to_dictionary())))
        .collect();
    top_level.insert("objects".to_string(), Value::Dictionary(objects));
    if let Some(root) = &doc.root_object {
        top_level.insert("rootObject".to_string(), Value::from(root.to_string()));
    }

    let mut root = Value::Dictionary(top_level);
    value::sort_keys(&mut root);
    let mut bytes = Vec::new();
    root.to_writer_xml(&mut bytes)?;
    Ok(escape_carriage_returns(bytes))
}

/// XML readers fold a literal CR into LF, so string values such as a
/// `shellScript` with CRLF line endings are written with `&#13;` instead.
/// The writer itself only emits LF, so every CR left in the output belongs
/// to a string value.
fn escape_carriage_returns(bytes: Vec<u8>) -> Vec<u8> {
    if !bytes.contains(&b'\r') {
        return bytes;
    }
    let mut escaped = Vec::with_capacity(bytes.len() + 16);
    for byte in bytes {
        if byte == b'\r' {
            escaped.extend_from_slice(b"&#13;");
        } else {
            escaped.push(byte);
        }
    }
    escaped
}

/// Read and decode the descriptor at `path`.
pub fn load(path: &Path) -> Result<ProjectDocument> {
    let bytes = fs::read(path)?;
    let doc = decode(&bytes)?;
    log::debug!(
        "loaded {} ({} objects, objectVersion {:?})",
        path.display(),
        doc.objects.len(),
        doc.object_version()
    );
    Ok(doc)
}

/// Encode `doc` and atomically replace the file at `path` with it.
pub fn save(doc: &ProjectDocument, path: &Path) -> Result<()> {
    let bytes = encode(doc)?;
    write_atomic(path, &bytes)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Replace `path` with `bytes` through a temporary sibling file.
///
/// An existing file keeps its permissions; the temporary file is created
/// owner-only and would otherwise replace them.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
