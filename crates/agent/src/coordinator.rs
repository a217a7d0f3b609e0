//! Multi-agent delegation.
//!
//! The coordinator routes free-text requests to specialists by exposing
//! each one as a tool and letting the model's tool selection decide —
//! zero, one, or several specialists per request, or a direct answer for
//! generic queries. There is no routing state machine; the policy is
//! natural language composed from the specialist descriptions.

use memento_core::error::{AgentError, Error};
use memento_core::event::EventBus;
use memento_core::provider::Provider;
use memento_core::tool::{Tool, ToolRegistry, ToolResult};
use std::sync::Arc;
use tracing::debug;

use crate::runner::AgentRunner;
use crate::specialist::Specialist;

const BASE_POLICY: &str = "You are a coordinator. Route each user request to the specialist \
tool that handles its topic; a request may need several specialists. Answer generic \
questions yourself without delegating. When a specialist responds, relay the essence of \
its answer to the user.";

/// Routes requests across a set of specialists.
pub struct Coordinator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    specialists: Vec<Arc<Specialist>>,
    event_bus: Arc<EventBus>,
    max_iterations: u32,
}

/// Adapter so a shared specialist can live in an owning `ToolRegistry`.
struct SpecialistTool(Arc<Specialist>);

#[async_trait::async_trait]
impl Tool for SpecialistTool {
    fn name(&self) -> &str {
        self.0.name()
    }
    fn description(&self) -> &str {
        self.0.description()
    }
    fn parameters_schema(&self) -> serde_json::Value {
        self.0.parameters_schema()
    }
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, memento_core::error::ToolError> {
        self.0.execute(arguments).await
    }
}

impl Coordinator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            specialists: Vec::new(),
            event_bus: Arc::new(EventBus::default()),
            max_iterations: 10,
        }
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

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = bus;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Register a specialist.
    ///
    /// Rejects a specialist whose memory namespace overlaps one already
    /// registered — overlapping namespaces cross-contaminate recalled
    /// context between specialists.
    pub fn with_specialist(mut self, specialist: Specialist) -> Result<Self, Error> {
        for existing in &self.specialists {
            if existing.namespace().overlaps(specialist.namespace()) {
                return Err(Error::Config {
                    message: format!(
                        "specialist '{}' namespace {} overlaps '{}' namespace {}",
                        specialist.config().name,
                        specialist.namespace(),
                        existing.config().name,
                        existing.namespace(),
                    ),
                });
            }
        }
        self.specialists.push(Arc::new(specialist));
        Ok(self)
    }

    /// The natural-language routing policy sent as the system prompt.
    fn routing_policy(&self) -> String {
        if self.specialists.is_empty() {
            return BASE_POLICY.to_string();
        }
        let roster: String = self
            .specialists
            .iter()
            .map(|s| format!("- {}: {}", s.config().name, s.config().description))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{BASE_POLICY}\n\nAvailable specialists:\n{roster}")
    }

    /// Handle one user request end to end.
    pub async fn handle(&self, text: &str) -> Result<String, AgentError> {
        let mut tools = ToolRegistry::new();
        for specialist in &self.specialists {
            tools.register(Box::new(SpecialistTool(specialist.clone())));
        }
        debug!(specialists = self.specialists.len(), "Coordinator handling request");

        // Fresh agent per request; continuity lives in the specialists'
        // memory namespaces, not here.
        let mut runner = AgentRunner::new(self.provider.clone(), &self.model, self.routing_policy())
            .with_temperature(self.temperature)
            .with_tools(Arc::new(tools))
            .with_event_bus(self.event_bus.clone())
            .with_max_iterations(self.max_iterations);
        if let Some(max) = self.max_tokens {
            runner = runner.with_max_tokens(max);
        }

        runner.invoke(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialist::SpecialistConfig;
    use crate::test_helpers::*;
    use memento_core::identity::SessionId;
    use memento_core::store::{ExtractionStrategy, ResourceSpec};
    use memento_core::store::MemoryStore;
    use memento_store::InMemoryStore;

    async fn store_with_resource() -> (Arc<InMemoryStore>, String) {
        let store = Arc::new(InMemoryStore::new());
        let resource = store
            .create_resource(ResourceSpec {
                name: "travel".into(),
                strategies: vec![ExtractionStrategy::Semantic],
                event_retention_days: 30,
            })
            .await
            .unwrap();
        (store, resource.id)
    }

    fn specialist(
        name: &str,
        provider: Arc<SequentialMockProvider>,
        store: Arc<InMemoryStore>,
        resource_id: &str,
    ) -> Specialist {
        Specialist::new(
            SpecialistConfig {
                name: name.into(),
                description: format!("Handles {name} requests"),
                system_prompt: format!("You are the {name} specialist."),
            },
            provider,
            "mock-model",
            store,
            resource_id.to_string(),
            SessionId::generate(),
        )
    }

    #[tokio::test]
    async fn direct_answer_without_delegation() {
        let (store, resource_id) = store_with_resource().await;
        let coordinator_provider = Arc::new(SequentialMockProvider::single_text("It's 2."));

        let coordinator = Coordinator::new(coordinator_provider, "mock-model")
            .with_specialist(specialist(
                "flight_booking",
                Arc::new(SequentialMockProvider::new(vec![])),
                store,
                &resource_id,
            ))
            .unwrap();

        let answer = coordinator.handle("What's 17 mod 5?").await.unwrap();
        assert_eq!(answer, "It's 2.");
    }

    #[tokio::test]
    async fn delegates_to_selected_specialist() {
        let (store, resource_id) = store_with_resource().await;

        // Coordinator: first picks the flight specialist, then relays.
        let coordinator_provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call(
                    "flight_booking",
                    serde_json::json!({"request": "book a flight to Lisbon"}),
                )],
                "",
            ),
            make_text_response("Your flight to Lisbon is booked."),
        ]));
        let flight_provider = Arc::new(SequentialMockProvider::single_text("Booked F123."));

        let coordinator = Coordinator::new(coordinator_provider, "mock-model")
            .with_specialist(specialist(
                "flight_booking",
                flight_provider.clone(),
                store,
                &resource_id,
            ))
            .unwrap();

        let answer = coordinator.handle("Get me to Lisbon").await.unwrap();
        assert_eq!(answer, "Your flight to Lisbon is booked.");
        assert_eq!(flight_provider.call_count(), 1);
    }

    #[tokio::test]
    async fn token_cap_reaches_the_model_request() {
        let provider = Arc::new(SequentialMockProvider::single_text("ok"));
        let coordinator = Coordinator::new(provider.clone(), "mock-model").with_max_tokens(256);

        coordinator.handle("hi").await.unwrap();
        assert_eq!(provider.requests()[0].max_tokens, Some(256));
    }

    #[tokio::test]
    async fn routing_policy_lists_specialists() {
        let (store, resource_id) = store_with_resource().await;
        let coordinator = Coordinator::new(
            Arc::new(SequentialMockProvider::new(vec![])),
            "mock-model",
        )
        .with_specialist(specialist(
            "flight_booking",
            Arc::new(SequentialMockProvider::new(vec![])),
            store.clone(),
            &resource_id,
        ))
        .unwrap()
        .with_specialist(specialist(
            "hotel_booking",
            Arc::new(SequentialMockProvider::new(vec![])),
            store,
            &resource_id,
        ))
        .unwrap();

        let policy = coordinator.routing_policy();
        assert!(policy.contains("flight_booking"));
        assert!(policy.contains("hotel_booking"));
    }

    #[tokio::test]
    async fn specialist_failure_does_not_sink_the_request() {
        let (store, resource_id) = store_with_resource().await;

        let coordinator_provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call(
                    "flight_booking",
                    serde_json::json!({"request": "book it"}),
                )],
                "",
            ),
            make_text_response("Flights are unavailable right now."),
        ]));
        // Empty answer makes the specialist's inner agent fail; the
        // failure is returned as text, not raised.
        let flight_provider = Arc::new(SequentialMockProvider::new(vec![make_text_response("")]));

        let coordinator = Coordinator::new(coordinator_provider, "mock-model")
            .with_specialist(specialist(
                "flight_booking",
                flight_provider,
                store,
                &resource_id,
            ))
            .unwrap();

        let answer = coordinator.handle("Get me a flight").await.unwrap();
        assert_eq!(answer, "Flights are unavailable right now.");
    }
}
