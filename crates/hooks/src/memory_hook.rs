//! The memory hook provider.
//!
//! Bridges an agent's turn-taking lifecycle to a memory store so the
//! caller never manages retrieval or persistence by hand:
//!
//! - after a user turn is appended, relevant records are recalled and
//!   appended to that turn as a labeled context suffix;
//! - after the assistant responds, the nearest (user, assistant) pair is
//!   appended to the store as one conversation event.
//!
//! Both operations treat the store as unreliable. A failed retrieval or
//! save degrades to a no-op for that turn — logged and published as a
//! domain event, never surfaced to the conversation.

use async_trait::async_trait;
use chrono::Utc;
use memento_core::event::{DomainEvent, EventBus};
use memento_core::hook::HookProvider;
use memento_core::identity::{ActorId, Namespace, SessionId};
use memento_core::store::{EventTurn, MemoryStore};
use memento_core::transcript::{Role, Transcript, find_last_exchange};
use std::sync::Arc;
use tracing::{debug, warn};

/// Label prefixing recalled context appended to a user turn, so the model
/// can tell new input from remembered context.
const CONTEXT_LABEL: &str = "Previous context:";

/// A hook provider bound to one memory resource, namespace, and
/// actor/session identity.
pub struct MemoryHook {
    store: Arc<dyn MemoryStore>,
    resource_id: String,
    namespace: Namespace,
    actor: ActorId,
    session: SessionId,
    top_k: usize,
    event_bus: Option<Arc<EventBus>>,
}

impl MemoryHook {
    /// Create a hook for the given store, resource, and actor/session.
    ///
    /// The retrieval namespace defaults to the actor's conventional
    /// namespace ([`Namespace::for_actor`]), which is where the store
    /// consolidates this actor's events.
    pub fn new(
        store: Arc<dyn MemoryStore>,
        resource_id: impl Into<String>,
        actor: ActorId,
        session: SessionId,
    ) -> Self {
        let namespace = Namespace::for_actor(&actor);
        Self {
            store,
            resource_id: resource_id.into(),
            namespace,
            actor,
            session,
            top_k: 5,
            event_bus: None,
        }
    }

    /// Override the retrieval namespace.
    ///
    /// Only retrieval is affected: saves go through `append_event`, and
    /// where records land is the store's decision. The local stores
    /// always consolidate under [`Namespace::for_actor`], so against
    /// them an override reads a namespace this hook never writes —
    /// useful for read-only recall of another actor's memories, wrong
    /// for this hook's own save/recall loop. Against a remote store the
    /// override targets whichever namespaces the resource's extraction
    /// strategies populate.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set how many records to recall per turn.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Publish memory activity to an event bus.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

#[async_trait]
impl HookProvider for MemoryHook {
    fn name(&self) -> &str {
        "memory"
    }

    /// Retrieve relevant memories and inject them into the latest user
    /// turn. Strictly best-effort: on zero records or any store failure
    /// the turn is left byte-identical.
    async fn on_turn_appended(&self, transcript: &mut Transcript) {
        let Some(turn) = transcript.last() else {
            return;
        };
        if !turn.is_user_text() {
            // Tool-result echoes and assistant turns carry no new user
            // intent to recall against.
            return;
        }
        let query = turn.content.clone();

        let records = match self
            .store
            .retrieve(&self.resource_id, &self.namespace, &query, self.top_k)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Memory retrieval failed; continuing without context");
                self.publish(DomainEvent::MemorySkipped {
                    reason: format!("retrieval failed: {e}"),
                    timestamp: Utc::now(),
                });
                return;
            }
        };

        // Store order is the store's ranking; keep it.
        let contents: Vec<&str> = records
            .iter()
            .map(|r| r.content.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        if contents.is_empty() {
            debug!(namespace = %self.namespace, "No memories recalled");
            return;
        }

        let count = contents.len();
        if let Some(turn) = transcript.last_mut() {
            turn.content = format!(
                "{}\n\n{CONTEXT_LABEL}\n{}",
                turn.content,
                contents.join("\n")
            );
        }

        debug!(namespace = %self.namespace, count, "Injected recalled context");
        self.publish(DomainEvent::MemoryRetrieved {
            namespace: self.namespace.as_str().to_string(),
            count,
            timestamp: Utc::now(),
        });
    }

    /// Persist the completed exchange. Fire-and-forget: failures are
    /// logged, never raised, never retried here.
    async fn on_invocation_completed(&self, transcript: &Transcript) {
        if transcript.len() < 2 {
            return;
        }
        match transcript.last() {
            Some(turn) if turn.role == Role::Assistant => {}
            _ => return,
        }

        let Some((user_idx, assistant_idx)) = find_last_exchange(transcript.turns()) else {
            debug!("No complete exchange to save; skipping");
            self.publish(DomainEvent::MemorySkipped {
                reason: "no user/assistant pair".into(),
                timestamp: Utc::now(),
            });
            return;
        };

        let turns = [
            EventTurn::new(Role::User, transcript.turns()[user_idx].content.clone()),
            EventTurn::new(
                Role::Assistant,
                transcript.turns()[assistant_idx].content.clone(),
            ),
        ];

        match self
            .store
            .append_event(&self.resource_id, &self.actor, &self.session, &turns)
            .await
        {
            Ok(()) => {
                debug!(namespace = %self.namespace, "Saved exchange to memory");
                self.publish(DomainEvent::MemorySaved {
                    namespace: self.namespace.as_str().to_string(),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Memory save failed; conversation continues");
                self.publish(DomainEvent::MemorySkipped {
                    reason: format!("save failed: {e}"),
                    timestamp: Utc::now(),
                });
            }
        }
    }
}
