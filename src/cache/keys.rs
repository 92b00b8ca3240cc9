//! Cache key definitions.
//!
//! Keys are structured values: a resource-kind namespace plus a tagged suffix
//! that is either a literal entity identifier or a query fingerprint. Map
//! lookups compare the structure, so an entity id that happens to render like a
//! fingerprint can never alias a collection entry. `Display` follows the
//! `"<kind>:<suffix>"` convention and is only used for logs.

use std::fmt;

use serde::Serialize;

use super::fingerprint::{Fingerprint, FingerprintError};

/// Namespace identifying a resource kind, e.g. `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKind(&'static str);

impl ResourceKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// What a key addresses inside its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeySuffix {
    /// A single record looked up by identifier.
    Entity(String),
    /// A collection result for a fingerprinted query.
    Query(Fingerprint),
}

/// Unified cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: ResourceKind,
    suffix: KeySuffix,
}

impl CacheKey {
    /// Key for a single record, e.g. `floor:42`.
    pub fn entity(kind: ResourceKind, id: impl fmt::Display) -> Self {
        Self {
            kind,
            suffix: KeySuffix::Entity(id.to_string()),
        }
    }

    /// Key for a collection result, e.g. `floor:<fingerprint>`.
    pub fn query<Q>(kind: ResourceKind, query: &Q) -> Result<Self, FingerprintError>
    where
        Q: Serialize + ?Sized,
    {
        Ok(Self::for_fingerprint(kind, Fingerprint::of(query)?))
    }

    pub fn for_fingerprint(kind: ResourceKind, fingerprint: Fingerprint) -> Self {
        Self {
            kind,
            suffix: KeySuffix::Query(fingerprint),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.suffix, KeySuffix::Query(_))
    }

    #[cfg(test)]
    fn suffix(&self) -> &KeySuffix {
        &self.suffix
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            KeySuffix::Entity(id) => write!(f, "{}:{}", self.kind, id),
            KeySuffix::Query(fingerprint) => write!(f, "{}:{}", self.kind, fingerprint),
        }
    }
}
