//! # Error Handling
//!
//! This module defines the centralized error type for `pbxpatch`. It uses the
//! `thiserror` library to describe every failure mode of the engine and its
//! collaborators with enough context for an operator to diagnose a failed run.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The first four variants belong to the
//!   project-graph engine:
//!   - `Format` / `Plist`: the descriptor could not be decoded.
//!   - `NotFound`: a required query had no match. The message names the query.
//!   - `DanglingReference`: an identifier points at nothing, or a header has
//!     no owning build file.
//!   - `Io` / `Persist`: reading or atomically replacing a file failed.
//!
//!   The remaining variants cover recipe parsing and the small collaborators
//!   (workspace files, text patches, build logs, directory copies).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every engine operation fails fast: callers propagate with `?` and the run
//! aborts before anything is encoded or written.

use thiserror::Error;

/// Main error type for pbxpatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor is not a well-formed property list, or it does not have
    /// the shape of a project (no `objects` dictionary, an object without
    /// `isa`, a `files` list that is not a list of identifiers, ...).
    #[error("Malformed project descriptor: {message}")]
    Format { message: String },

    /// A required object or predicate match is absent.
    #[error("Not found: {query}")]
    NotFound { query: String },

    /// A reference is structurally inconsistent.
    #[error("Dangling reference {id}: {context}")]
    DanglingReference { id: String, context: String },

    /// An error occurred while parsing the `.pbxpatch.yaml` recipe.
    #[error("Recipe parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the recipe
        hint: Option<String>,
    },

    /// A workspace file could not be read, parsed or updated.
    #[error("Workspace error: {message}")]
    Workspace { message: String },

    /// A source text patch could not be applied.
    #[error("Text patch error in {path}: {message}")]
    TextPatch { path: String, message: String },

    /// The external build did not report success.
    #[error("Build failed: {message}")]
    BuildFailed { message: String },

    /// A host filesystem operation (directory replace, file copy) failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The descriptor bytes are not a property list in any of the text, XML
    /// or binary forms, wrapped from `plist::Error`.
    #[error("Malformed property list: {0}")]
    Plist(#[from] plist::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The temporary file holding the rewritten descriptor could not be
    /// renamed over the original.
    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::Format {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(query: impl std::fmt::Display) -> Self {
        Error::NotFound {
            query: query.to_string(),
        }
    }

    pub(crate) fn dangling(id: impl std::fmt::Display, context: impl Into<String>) -> Self {
        Error::DanglingReference {
            id: id.to_string(),
            context: context.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
