//! MemoryStore trait — the contract with the long-term memory service.
//!
//! The store owns the hard parts: extracting durable facts from raw
//! conversation events and serving them back by similarity. That
//! consolidation happens asynchronously on the store's side, so a record
//! may only become retrievable seconds (or longer) after the event that
//! produced it was appended. Callers must tolerate that lag.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::identity::{ActorId, Namespace, SessionId};
use crate::transcript::Role;

/// How the store distills raw events into queryable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Extract durable facts and entities
    Semantic,
    /// Rolling conversation summaries
    Summary,
    /// User preference extraction
    UserPreference,
}

/// Request to create a named memory resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Human-chosen resource name, unique within the store
    pub name: String,

    /// At least one extraction strategy
    pub strategies: Vec<ExtractionStrategy>,

    /// How long raw events are retained before expiry
    pub event_retention_days: u32,
}

/// A live memory resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryResource {
    /// Store-assigned resource id
    pub id: String,

    /// The name it was created under
    pub name: String,

    pub strategies: Vec<ExtractionStrategy>,

    pub event_retention_days: u32,

    pub created_at: DateTime<Utc>,
}

/// A consolidated, queryable unit of previously stored content.
///
/// Records are created by the store, never mutated, and deleted only by
/// resource teardown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned record id
    pub id: String,

    /// The namespace this record is scoped to
    pub namespace: String,

    /// Opaque consolidated content
    pub content: String,

    pub created_at: DateTime<Utc>,

    /// Relevance score assigned by the store for this query
    #[serde(default)]
    pub score: f32,
}

/// One (role, text) pair of an appended conversation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTurn {
    pub role: Role,
    pub content: String,
}

impl EventTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The memory store contract.
///
/// Implementations: in-memory and SQLite (local), HTTP (remote service),
/// no-op (memory disabled). All methods are scoped to a resource id
/// obtained from `create_resource` or `list_resources`.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "in_memory", "sqlite", "http").
    fn name(&self) -> &str;

    /// Create a named memory resource.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the name is taken;
    /// callers recover by resolving the existing resource via
    /// `list_resources`.
    async fn create_resource(&self, spec: ResourceSpec) -> Result<MemoryResource, StoreError>;

    /// List all live resources.
    async fn list_resources(&self) -> Result<Vec<MemoryResource>, StoreError>;

    /// Delete a resource and everything stored under it.
    async fn delete_resource(&self, resource_id: &str) -> Result<(), StoreError>;

    /// Retrieve records relevant to `query`, scoped to exactly one
    /// namespace. Result order is the store's ranking; callers must not
    /// re-rank.
    async fn retrieve(
        &self,
        resource_id: &str,
        namespace: &Namespace,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError>;

    /// Append one conversation event — an ordered sequence of turns —
    /// under the given actor and session. Consolidation into records is
    /// the store's job and happens out-of-band.
    async fn append_event(
        &self,
        resource_id: &str,
        actor: &ActorId,
        session: &SessionId,
        turns: &[EventTurn],
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_spec_serialization() {
        let spec = ResourceSpec {
            name: "support-memory".into(),
            strategies: vec![ExtractionStrategy::Semantic, ExtractionStrategy::Summary],
            event_retention_days: 30,
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("semantic"));
        assert!(!json.contains("user_preference"));
        let back: ResourceSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.strategies.len(), 2);
    }

    #[test]
    fn event_turn_carries_role() {
        let turn = EventTurn::new(Role::User, "Hi, I'm John");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "Hi, I'm John");
    }
}
