//! In-memory store — useful for testing and ephemeral sessions.
//!
//! Appended events are consolidated immediately into a record, but the
//! record only becomes *visible* to retrieval once the configured
//! consolidation delay has elapsed. That models the external service's
//! out-of-band consolidation: a save is not instantly retrievable.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use memento_core::error::StoreError;
use memento_core::identity::{ActorId, Namespace, SessionId};
use memento_core::store::{EventTurn, MemoryRecord, MemoryResource, MemoryStore, ResourceSpec};
use memento_core::transcript::Role;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredRecord {
    resource_id: String,
    record: MemoryRecord,
    visible_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    resources: HashMap<String, MemoryResource>,
    records: Vec<StoredRecord>,
}

/// An in-memory store with keyword similarity and simulated
/// consolidation lag.
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
    consolidation_delay: Duration,
}

impl InMemoryStore {
    /// Create a store whose saves are retrievable immediately.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            consolidation_delay: Duration::zero(),
        }
    }

    /// Create a store whose saves only become retrievable after `delay`.
    pub fn with_consolidation_delay(delay: std::time::Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            consolidation_delay: Duration::from_std(delay).unwrap_or_else(|_| Duration::zero()),
        }
    }

    /// Consolidate an event's turns into one record body.
    ///
    /// Real extraction is the remote service's job; locally we keep the
    /// raw exchange text, which is enough for keyword retrieval.
    fn consolidate(turns: &[EventTurn]) -> String {
        turns
            .iter()
            .map(|t| {
                let role = match t.role {
                    Role::User => "USER",
                    Role::Assistant => "ASSISTANT",
                    Role::System => "SYSTEM",
                };
                format!("{role}: {}", t.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create_resource(&self, spec: ResourceSpec) -> Result<MemoryResource, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.resources.values().any(|r| r.name == spec.name) {
            return Err(StoreError::AlreadyExists(spec.name));
        }
        let resource = MemoryResource {
            id: Uuid::new_v4().to_string(),
            name: spec.name,
            strategies: spec.strategies,
            event_retention_days: spec.event_retention_days,
            created_at: Utc::now(),
        };
        inner.resources.insert(resource.id.clone(), resource.clone());
        Ok(resource)
    }

    async fn list_resources(&self) -> Result<Vec<MemoryResource>, StoreError> {
        Ok(self.inner.read().await.resources.values().cloned().collect())
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.resources.remove(resource_id).is_none() {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }
        inner.records.retain(|r| r.resource_id != resource_id);
        Ok(())
    }

    async fn retrieve(
        &self,
        resource_id: &str,
        namespace: &Namespace,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let inner = self.inner.read().await;
        if !inner.resources.contains_key(resource_id) {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }

        let now = Utc::now();
        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        let mut results: Vec<MemoryRecord> = inner
            .records
            .iter()
            .filter(|r| {
                r.resource_id == resource_id
                    && r.record.namespace == namespace.as_str()
                    && r.visible_at <= now
            })
            .filter_map(|r| {
                let content_lower = r.record.content.to_lowercase();
                let occurrences: usize = terms
                    .iter()
                    .map(|t| content_lower.matches(t).count())
                    .sum();
                if occurrences == 0 {
                    return None;
                }
                let mut record = r.record.clone();
                record.score =
                    occurrences as f32 / (record.content.len() as f32 / 100.0).max(1.0);
                Some(record)
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);
        Ok(results)
    }

    async fn append_event(
        &self,
        resource_id: &str,
        actor: &ActorId,
        _session: &SessionId,
        turns: &[EventTurn],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.resources.contains_key(resource_id) {
            return Err(StoreError::NotFound(resource_id.to_string()));
        }
        if turns.is_empty() {
            return Ok(());
        }

        let namespace = Namespace::for_actor(actor);
        inner.records.push(StoredRecord {
            resource_id: resource_id.to_string(),
            record: MemoryRecord {
                id: Uuid::new_v4().to_string(),
                namespace: namespace.as_str().to_string(),
                content: Self::consolidate(turns),
                created_at: Utc::now(),
                score: 0.0,
            },
            visible_at: Utc::now() + self.consolidation_delay,
        });
        Ok(())
    }
}
