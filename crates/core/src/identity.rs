//! Actor, session, and namespace identifiers.
//!
//! Memory events are scoped by "who" (actor), "which run" (session), and
//! "which record set" (namespace). All three are explicit values passed
//! into constructors — there is no ambient global state. A fresh actor and
//! session per run means no two writers ever share a logical record set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Opaque identifier for "who" a memory event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh actor id for this run.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for "which conversation" a memory event belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh session id for this run.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hierarchical key scoping memory records to one actor or agent role.
///
/// Segments are joined with `/` (e.g. `"support/flights/actor-abc"`).
/// Specialists must not share overlapping namespaces, or recalled context
/// cross-contaminates between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace from a pre-joined path. Rejects empty input and
    /// empty segments.
    pub fn new(path: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.is_empty() {
            return Err(StoreError::InvalidNamespace("empty namespace".into()));
        }
        if path.split('/').any(|seg| seg.is_empty()) {
            return Err(StoreError::InvalidNamespace(format!(
                "empty segment in '{path}'"
            )));
        }
        Ok(Self(path))
    }

    /// Create a single-segment root namespace.
    pub fn root(segment: impl Into<String>) -> Result<Self, StoreError> {
        let segment = segment.into();
        if segment.is_empty() || segment.contains('/') {
            return Err(StoreError::InvalidNamespace(format!(
                "invalid root segment '{segment}'"
            )));
        }
        Ok(Self(segment))
    }

    /// Derive a child namespace by appending a segment.
    pub fn child(&self, segment: impl AsRef<str>) -> Result<Self, StoreError> {
        let segment = segment.as_ref();
        if segment.is_empty() || segment.contains('/') {
            return Err(StoreError::InvalidNamespace(format!(
                "invalid child segment '{segment}'"
            )));
        }
        Ok(Self(format!("{}/{segment}", self.0)))
    }

    /// The conventional namespace a store consolidates an actor's events
    /// under. Stores that perform their own consolidation (the local
    /// backends) place records here; hooks bound to the same actor query
    /// the same path, which is what keeps per-specialist record sets
    /// isolated.
    pub fn for_actor(actor: &ActorId) -> Self {
        Self(format!("memories/{}", actor.0))
    }

    /// Whether two namespaces scope overlapping record sets: equal, or one
    /// a path prefix of the other.
    pub fn overlaps(&self, other: &Namespace) -> bool {
        let (a, b) = (&self.0, &other.0);
        a == b
            || (a.starts_with(b.as_str()) && a.as_bytes().get(b.len()) == Some(&b'/'))
            || (b.starts_with(a.as_str()) && b.as_bytes().get(a.len()) == Some(&b'/'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_rejects_empty_segments() {
        assert!(Namespace::new("").is_err());
        assert!(Namespace::new("a//b").is_err());
        assert!(Namespace::new("a/b/").is_err());
        assert!(Namespace::new("support/flights").is_ok());
    }

    #[test]
    fn namespace_child_composition() {
        let root = Namespace::root("travel").unwrap();
        let flights = root.child("flights").unwrap();
        assert_eq!(flights.as_str(), "travel/flights");
        assert!(root.child("a/b").is_err());
    }

    #[test]
    fn namespace_overlap_is_prefix_aware() {
        let root = Namespace::root("travel").unwrap();
        let flights = root.child("flights").unwrap();
        let hotels = root.child("hotels").unwrap();

        assert!(root.overlaps(&flights));
        assert!(flights.overlaps(&root));
        assert!(!flights.overlaps(&hotels));

        // "travel/fl" is not a segment prefix of "travel/flights"
        let partial = Namespace::new("travel/fl").unwrap();
        assert!(!partial.overlaps(&flights));
    }

    #[test]
    fn actor_namespaces_do_not_overlap() {
        let a = Namespace::for_actor(&ActorId::generate("flights"));
        let b = Namespace::for_actor(&ActorId::generate("hotels"));
        assert!(!a.overlaps(&b));
        assert!(a.as_str().starts_with("memories/flights-"));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
        let a = ActorId::generate("agent");
        assert!(a.0.starts_with("agent-"));
    }
}
