//! Specialist agents exposed as callable tools.
//!
//! A specialist packages a narrow-domain agent — its own system prompt,
//! tool set, and a memory hook bound to a namespace unique to the
//! specialist's actor identity. The coordinator sees it as one tool
//! taking free text and returning free text.

use async_trait::async_trait;
use chrono::Utc;
use memento_core::error::ToolError;
use memento_core::event::{DomainEvent, EventBus};
use memento_core::identity::{ActorId, Namespace, SessionId};
use memento_core::provider::Provider;
use memento_core::store::MemoryStore;
use memento_core::tool::{Tool, ToolRegistry, ToolResult};
use memento_hooks::MemoryHook;
use std::sync::Arc;
use tracing::info;

use crate::runner::AgentRunner;

/// Static description of a specialist's domain.
#[derive(Debug, Clone)]
pub struct SpecialistConfig {
    /// Tool name the coordinator delegates by (e.g. "flight_booking")
    pub name: String,
    /// What this specialist handles, for the routing policy
    pub description: String,
    /// The specialist's own system prompt
    pub system_prompt: String,
}

/// A narrow-domain agent with isolated memory, callable as a tool.
pub struct Specialist {
    config: SpecialistConfig,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    top_k: usize,
    tools: Arc<ToolRegistry>,
    store: Arc<dyn MemoryStore>,
    resource_id: String,
    actor: ActorId,
    session: SessionId,
    namespace: Namespace,
    event_bus: Arc<EventBus>,
}

impl Specialist {
    /// Create a specialist bound to the given store resource and session.
    ///
    /// A fresh actor id is generated from the specialist's name, which
    /// gives it a memory namespace disjoint from every other specialist.
    pub fn new(
        config: SpecialistConfig,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        store: Arc<dyn MemoryStore>,
        resource_id: impl Into<String>,
        session: SessionId,
    ) -> Self {
        let actor = ActorId::generate(&config.name);
        let namespace = Namespace::for_actor(&actor);
        Self {
            config,
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            top_k: 5,
            tools: Arc::new(ToolRegistry::new()),
            store,
            resource_id: resource_id.into(),
            actor,
            session,
            namespace,
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Reuse an actor identity from an earlier run (stable memory across
    /// runs). The namespace follows the actor.
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.namespace = Namespace::for_actor(&actor);
        self.actor = actor;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set how many memory records the specialist recalls per turn.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Give the specialist its own working tools.
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = bus;
        self
    }

    pub fn config(&self) -> &SpecialistConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Handle one delegated request with a fresh agent instance.
    ///
    /// No mutable state survives between calls — whatever should persist
    /// lives in the memory store.
    async fn handle(&self, request: &str) -> String {
        self.event_bus.publish(DomainEvent::SpecialistInvoked {
            name: self.config.name.clone(),
            timestamp: Utc::now(),
        });
        info!(specialist = %self.config.name, "Delegated request");

        let hook = MemoryHook::new(
            self.store.clone(),
            self.resource_id.clone(),
            self.actor.clone(),
            self.session.clone(),
        )
        .with_top_k(self.top_k)
        .with_event_bus(self.event_bus.clone());

        let mut runner = AgentRunner::new(
            self.provider.clone(),
            &self.model,
            &self.config.system_prompt,
        )
        .with_temperature(self.temperature)
        .with_tools(self.tools.clone())
        .with_hook(Arc::new(hook))
        .with_event_bus(self.event_bus.clone());
        if let Some(max) = self.max_tokens {
            runner = runner.with_max_tokens(max);
        }

        // A specialist is itself invoked as a delegated tool, so it never
        // raises: errors become a textual description for the caller.
        match runner.invoke(request).await {
            Ok(answer) => answer,
            Err(e) => format!("The {} specialist could not complete the request: {e}", self.config.name),
        }
    }
}

#[async_trait]
impl Tool for Specialist {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "The user's request, in plain language"
                }
            },
            "required": ["request"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let Some(request) = arguments["request"].as_str() else {
            return Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: "Missing 'request' argument".into(),
            });
        };

        let output = self.handle(request).await;
        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
        })
    }
}
