//! Method-scoped text patches for Objective-C sources.
//!
//! A patch names a method by its signature (`- (BOOL)shouldAutorotate`) and
//! replaces the first occurrence of a literal inside the method's body. The
//! body runs from the signature to the first closing brace after it, which
//! is exact for the short accessor-style methods these patches target.

use std::fs;
use std::path::Path;

use log::info;
use regex::Regex;

use crate::error::{Error, Result};
use crate::project::codec::write_atomic;

pub const DEFAULT_FIND: &str = "return YES;";
pub const DEFAULT_REPLACE: &str = "return NO;";

/// One replacement inside one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub method: String,
    pub find: String,
    pub replace: String,
}

impl TextPatch {
    /// Patch flipping `return YES;` to `return NO;` in `method`.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            find: DEFAULT_FIND.to_string(),
            replace: DEFAULT_REPLACE.to_string(),
        }
    }

    pub fn with_literal(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.find = find.into();
        self.replace = replace.into();
        self
    }

    /// Whitespace between signature tokens may vary; the signature must not
    /// run on into a longer identifier.
    fn signature_pattern(&self) -> Result<Regex> {
        let tokens: Vec<String> = self.method.split_whitespace().map(regex::escape).collect();
        let mut pattern = tokens.join(r"\s+");
        if self
            .method
            .chars()
            .last()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            pattern.push_str(r"\b");
        }
        Ok(Regex::new(&pattern)?)
    }

    /// Apply to `source`, returning the patched text.
    ///
    /// `path` only labels errors.
    pub fn apply_to(&self, source: &str, path: &str) -> Result<String> {
        let error = |message: String| Error::TextPatch {
            path: path.to_string(),
            message,
        };
        // An empty signature matches at offset 0 and an empty literal
        // matches anywhere, so either would patch text outside any method.
        if self.method.trim().is_empty() {
            return Err(error("method signature is empty".to_string()));
        }
        if self.find.is_empty() {
            return Err(error(format!("literal to replace in {} is empty", self.method)));
        }
        let signature = self
            .signature_pattern()?
            .find(source)
            .ok_or_else(|| error(format!("method not found: {}", self.method)))?;

        let start = signature.start();
        let end = source[start..]
            .find('}')
            .map(|offset| start + offset)
            .ok_or_else(|| error(format!("no closing brace after {}", self.method)))?;

        let body = &source[start..end];
        let at = body
            .find(self.find.as_str())
            .ok_or_else(|| error(format!("{:?} not found inside {}", self.find, self.method)))?;

        let mut patched = String::with_capacity(source.len() + self.replace.len());
        patched.push_str(&source[..start + at]);
        patched.push_str(&self.replace);
        patched.push_str(&source[start + at + self.find.len()..]);
        Ok(patched)
    }

    /// Patch the file at `path` in place.
    pub fn apply_to_file(&self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path)?;
        let patched = self.apply_to(&source, &path.display().to_string())?;
        write_atomic(path, patched.as_bytes())?;
        info!("patched {} in {}", self.method, path.display());
        Ok(())
    }
}
