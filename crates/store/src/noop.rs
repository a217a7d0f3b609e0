//! No-op store — memory disabled.

use async_trait::async_trait;
use memento_core::error::StoreError;
use memento_core::identity::{ActorId, Namespace, SessionId};
use memento_core::store::{EventTurn, MemoryRecord, MemoryResource, MemoryStore, ResourceSpec};

/// A store that remembers nothing. Retrieval always returns an empty set,
/// appends succeed and discard. Useful when memory is switched off.
pub struct NoopStore;

#[async_trait]
impl MemoryStore for NoopStore {
    fn name(&self) -> &str {
        "noop"
    }

    async fn create_resource(&self, spec: ResourceSpec) -> Result<MemoryResource, StoreError> {
        Ok(MemoryResource {
            id: format!("noop-{}", spec.name),
            name: spec.name,
            strategies: spec.strategies,
            event_retention_days: spec.event_retention_days,
            created_at: chrono::Utc::now(),
        })
    }

    async fn list_resources(&self) -> Result<Vec<MemoryResource>, StoreError> {
        Ok(Vec::new())
    }

    async fn delete_resource(&self, _resource_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn retrieve(
        &self,
        _resource_id: &str,
        _namespace: &Namespace,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn append_event(
        &self,
        _resource_id: &str,
        _actor: &ActorId,
        _session: &SessionId,
        _turns: &[EventTurn],
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memento_core::transcript::Role;

    #[tokio::test]
    async fn noop_retrieval_is_empty_after_append() {
        let store = NoopStore;
        let actor = ActorId::new("actor-1");
        let session = SessionId::new("session-1");

        store
            .append_event(
                "res",
                &actor,
                &session,
                &[EventTurn::new(Role::User, "remember this")],
            )
            .await
            .unwrap();

        let namespace = Namespace::for_actor(&actor);
        let records = store
            .retrieve("res", &namespace, "remember", 10)
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
