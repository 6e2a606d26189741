use crate::kind::RefKind;
use std::fmt;

/// Which naming space a reference identifier lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSpace {
    Handle,
    Uid,
}

/// A typed pointer from a declarative fragment to another schema object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: RefKind,
    pub identifier: String,
    pub space: IdentifierSpace,
}

/// Marker meaning "every object of the expected kind".
pub const WILDCARD: &str = "*";

impl Reference {
    /// Split `kind:identifier` on the first `:`.
    ///
    /// Returns `None` when the string carries no kind prefix.
    pub fn split(raw: &str) -> Option<(&str, &str)> {
        raw.split_once(':')
    }

    /// Parse a serialized reference, using `expected` when no prefix is present.
    pub fn parse(raw: &str, expected: &RefKind, space: IdentifierSpace) -> Self {
        match Self::split(raw) {
            Some((kind, identifier)) => Self {
                kind: RefKind::parse(kind),
                identifier: identifier.to_string(),
                space,
            },
            None => Self {
                kind: expected.clone(),
                identifier: raw.to_string(),
                space,
            },
        }
    }

    /// Strings that are never resolved: the wildcard and the empty string.
    pub fn is_passthrough_literal(raw: &str) -> bool {
        raw == WILDCARD || raw.is_empty()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.identifier)
    }
}
