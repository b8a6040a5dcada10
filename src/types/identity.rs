//! Caller identity
//!
//! The ledger never authenticates anyone. The execution environment hands it an
//! identity for every call and the ledger only stores and compares it.

use std::fmt;

/// Opaque identifier of an acting party (seller or buyer)
///
/// Identities are compared by value and ordered lexicographically, which gives
/// deterministic output when accounts are listed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(String);

impl Identity {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Identity(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Identity::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Identity(id)
    }
}
