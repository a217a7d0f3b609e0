//! The agent invocation loop.

use chrono::Utc;
use memento_core::error::AgentError;
use memento_core::event::{DomainEvent, EventBus};
use memento_core::hook::HookProvider;
use memento_core::provider::{Provider, ProviderRequest};
use memento_core::tool::ToolRegistry;
use memento_core::transcript::{Transcript, Turn};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs one agent: a system prompt, a tool set, and a list of lifecycle
/// hook providers around an LLM provider.
///
/// The runner holds no conversation state; each `invoke` owns a fresh
/// transcript. Anything worth keeping across invocations is the memory
/// hook's job.
pub struct AgentRunner {
    provider: Arc<dyn Provider>,
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    hooks: Vec<Arc<dyn HookProvider>>,
    event_bus: Arc<EventBus>,
    max_iterations: u32,
}

impl AgentRunner {
    /// Create a new runner.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.7,
            max_tokens: None,
            tools: Arc::new(ToolRegistry::new()),
            hooks: Vec::new(),
            event_bus: Arc::new(EventBus::default()),
            max_iterations: 10,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    /// Register a hook provider. Hooks fire in registration order.
    pub fn with_hook(mut self, hook: Arc<dyn HookProvider>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = bus;
        self
    }

    /// Set the maximum number of tool-call iterations per invocation.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    async fn fire_turn_appended(&self, transcript: &mut Transcript) {
        for hook in &self.hooks {
            hook.on_turn_appended(transcript).await;
        }
    }

    async fn fire_invocation_completed(&self, transcript: &Transcript) {
        for hook in &self.hooks {
            hook.on_invocation_completed(transcript).await;
        }
    }

    /// Invoke the agent with free text and return its textual answer.
    ///
    /// Sequential within one conversation: retrieval hooks run before the
    /// model call, persistence hooks after the response turn lands.
    pub async fn invoke(&self, text: &str) -> Result<String, AgentError> {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user(text));
        self.fire_turn_appended(&mut transcript).await;

        for iteration in 0..self.max_iterations {
            let request = ProviderRequest {
                model: self.model.clone(),
                system_prompt: self.system_prompt.clone(),
                turns: transcript.turns().to_vec(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: self.tools.definitions(),
            };

            let response = self.provider.complete(request).await?;
            let turn = response.turn;

            if turn.tool_calls.is_empty() {
                if turn.content.is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                let answer = turn.content.clone();
                transcript.push(turn);
                self.fire_invocation_completed(&transcript).await;

                self.event_bus.publish(DomainEvent::InvocationCompleted {
                    turns: transcript.len(),
                    timestamp: Utc::now(),
                });
                debug!(iterations = iteration + 1, turns = transcript.len(), "Invocation complete");
                return Ok(answer);
            }

            let calls = turn.tool_calls.clone();
            transcript.push(turn);
            self.fire_turn_appended(&mut transcript).await;

            for call in calls {
                info!(tool = %call.name, "Executing tool call");
                let output = match self.tools.execute(&call).await {
                    Ok(result) => result.output,
                    Err(e) => {
                        // The model sees the failure and can recover or
                        // answer without the tool.
                        warn!(tool = %call.name, error = %e, "Tool execution failed");
                        format!("Error: {e}")
                    }
                };
                transcript.push(Turn::tool_result(&call.id, output));
                self.fire_turn_appended(&mut transcript).await;
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use async_trait::async_trait;
    use memento_core::error::ToolError;
    use memento_core::tool::{Tool, ToolResult};

    struct UppercaseTool;

    #[async_trait]
    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }
        fn description(&self) -> &str {
            "Uppercases the given text"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("").to_uppercase();
            Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: text,
            })
        }
    }

    #[tokio::test]
    async fn plain_invocation_returns_text() {
        let provider = Arc::new(SequentialMockProvider::single_text("Hello there"));
        let runner = AgentRunner::new(provider, "mock-model", "You are helpful.");

        let answer = runner.invoke("hi").await.unwrap();
        assert_eq!(answer, "Hello there");
    }

    #[tokio::test]
    async fn tool_call_loop_executes_and_continues() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call("uppercase", serde_json::json!({"text": "loud"}))],
                "",
            ),
            make_text_response("The result is LOUD"),
        ]));

        let mut tools = ToolRegistry::new();
        tools.register(Box::new(UppercaseTool));

        let runner = AgentRunner::new(provider.clone(), "mock-model", "You shout.")
            .with_tools(Arc::new(tools));

        let answer = runner.invoke("make it loud").await.unwrap();
        assert_eq!(answer, "The result is LOUD");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn missing_tool_is_reported_to_the_model() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call("nonexistent", serde_json::json!({}))],
                "",
            ),
            make_text_response("I could not use that tool."),
        ]));

        let runner = AgentRunner::new(provider, "mock-model", "You try tools.");
        let answer = runner.invoke("try it").await.unwrap();
        assert_eq!(answer, "I could not use that tool.");
    }

    #[tokio::test]
    async fn iteration_cap_stops_runaway_loops() {
        // A provider that always asks for another tool call.
        let responses: Vec<_> = (0..4)
            .map(|_| {
                make_tool_call_response(
                    vec![make_tool_call("uppercase", serde_json::json!({"text": "x"}))],
                    "",
                )
            })
            .collect();
        let provider = Arc::new(SequentialMockProvider::new(responses));

        let mut tools = ToolRegistry::new();
        tools.register(Box::new(UppercaseTool));

        let runner = AgentRunner::new(provider, "mock-model", "loop")
            .with_tools(Arc::new(tools))
            .with_max_iterations(3);

        let err = runner.invoke("go").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(3)));
    }

    #[tokio::test]
    async fn hooks_fire_in_registration_order() {
        use memento_core::hook::HookProvider;
        use std::sync::Mutex;

        struct TaggingHook {
            tag: &'static str,
            log: Arc<Mutex<Vec<&'static str>>>,
        }

        #[async_trait]
        impl HookProvider for TaggingHook {
            fn name(&self) -> &str {
                self.tag
            }
            async fn on_invocation_completed(&self, _transcript: &Transcript) {
                self.log.lock().unwrap().push(self.tag);
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(SequentialMockProvider::single_text("ok"));
        let runner = AgentRunner::new(provider, "mock-model", "")
            .with_hook(Arc::new(TaggingHook {
                tag: "first",
                log: log.clone(),
            }))
            .with_hook(Arc::new(TaggingHook {
                tag: "second",
                log: log.clone(),
            }));

        runner.invoke("hi").await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }
}
