//! Object identifiers
//!
//! Every object in a descriptor is keyed by an opaque identifier. Xcode uses
//! 24 uppercase hexadecimal characters (96 bits); new identifiers minted here
//! follow the same convention. Identifiers read from disk are taken verbatim.

use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};

/// Length in hex characters of a freshly generated identifier.
pub const IDENTIFIER_LEN: usize = 24;

/// An opaque object identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Produces candidate identifiers.
///
/// Candidates are not guaranteed unique; the graph checks each one against
/// its keys and asks again on collision.
pub trait IdentifierSource {
    fn candidate(&mut self) -> Result<Identifier>;
}

/// 12 bytes from the operating system's random source, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdentifiers;

impl IdentifierSource for RandomIdentifiers {
    fn candidate(&mut self) -> Result<Identifier> {
        let mut bytes = [0u8; IDENTIFIER_LEN / 2];
        getrandom::getrandom(&mut bytes).map_err(|e| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("random source unavailable: {}", e),
            ))
        })?;
        Ok(Identifier(hex::encode_upper(bytes)))
    }
}

/// Counts upward from a starting value. Deterministic output for tests and
/// dry runs that need stable identifiers.
#[derive(Debug, Clone)]
pub struct SequentialIdentifiers {
    next: u128,
}

impl SequentialIdentifiers {
    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl IdentifierSource for SequentialIdentifiers {
    fn candidate(&mut self) -> Result<Identifier> {
        let id = format!("{:0width$X}", self.next, width = IDENTIFIER_LEN);
        self.next += 1;
        Ok(Identifier(id))
    }
}
