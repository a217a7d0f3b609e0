//! HTTP store — client for a remote memory service.
//!
//! The remote service owns extraction, consolidation, and retention; this
//! client only speaks its JSON API:
//!
//! - `POST   /v1/memories`                — create a resource
//! - `GET    /v1/memories`                — list resources
//! - `DELETE /v1/memories/{id}`           — delete a resource
//! - `POST   /v1/memories/{id}/retrieve`  — similarity query
//! - `POST   /v1/memories/{id}/events`    — append a conversation event

use async_trait::async_trait;
use memento_core::error::StoreError;
use memento_core::identity::{ActorId, Namespace, SessionId};
use memento_core::store::{EventTurn, MemoryRecord, MemoryResource, MemoryStore, ResourceSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A memory store backed by a remote HTTP service.
pub struct HttpStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpStore {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map an error-status response to a `StoreError`.
    async fn error_for(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match status {
            404 => StoreError::NotFound(body),
            409 => StoreError::AlreadyExists(body),
            500..=599 => StoreError::Unavailable(format!("status {status}: {body}")),
            _ => StoreError::Protocol(format!("status {status}: {body}")),
        }
    }
}

#[derive(Serialize)]
struct RetrieveBody<'a> {
    namespace: &'a str,
    query: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct RetrieveResponse {
    records: Vec<MemoryRecord>,
}

#[derive(Serialize)]
struct EventBody<'a> {
    actor_id: &'a str,
    session_id: &'a str,
    turns: &'a [EventTurn],
}

#[async_trait]
impl MemoryStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn create_resource(&self, spec: ResourceSpec) -> Result<MemoryResource, StoreError> {
        debug!(name = %spec.name, "Creating memory resource");
        let response = self
            .client
            .post(self.url("/v1/memories"))
            .bearer_auth(&self.api_key)
            .json(&spec)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(format!("Failed to parse resource: {e}")))
    }

    async fn list_resources(&self) -> Result<Vec<MemoryResource>, StoreError> {
        let response = self
            .client
            .get(self.url("/v1/memories"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(format!("Failed to parse resources: {e}")))
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/memories/{resource_id}")))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }

    async fn retrieve(
        &self,
        resource_id: &str,
        namespace: &Namespace,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let body = RetrieveBody {
            namespace: namespace.as_str(),
            query,
            limit,
        };
        let response = self
            .client
            .post(self.url(&format!("/v1/memories/{resource_id}/retrieve")))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        let parsed: RetrieveResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Protocol(format!("Failed to parse records: {e}")))?;
        Ok(parsed.records)
    }

    async fn append_event(
        &self,
        resource_id: &str,
        actor: &ActorId,
        session: &SessionId,
        turns: &[EventTurn],
    ) -> Result<(), StoreError> {
        let body = EventBody {
            actor_id: &actor.0,
            session_id: &session.0,
            turns,
        };
        debug!(resource = resource_id, actor = %actor, turns = turns.len(), "Appending event");
        let response = self
            .client
            .post(self.url(&format!("/v1/memories/{resource_id}/events")))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memento_core::transcript::Role;

    #[test]
    fn base_url_is_normalized() {
        let store = HttpStore::new("https://memory.example.com/", "key").unwrap();
        assert_eq!(store.url("/v1/memories"), "https://memory.example.com/v1/memories");
    }

    #[test]
    fn event_body_wire_format() {
        let turns = vec![
            EventTurn::new(Role::User, "Hi"),
            EventTurn::new(Role::Assistant, "Hello"),
        ];
        let body = EventBody {
            actor_id: "actor-1",
            session_id: "session-1",
            turns: &turns,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["actor_id"], "actor-1");
        assert_eq!(json["turns"][0]["role"], "user");
        assert_eq!(json["turns"][1]["role"], "assistant");
    }
}
