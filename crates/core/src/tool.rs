//! Tool trait — the abstraction over agent capabilities.
//!
//! The coordinator sees each specialist agent as a tool: one callable
//! taking free text and returning free text. Ordinary tools (lookups,
//! calculators) implement the same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,
}

/// The core Tool trait.
///
/// Specialist agent wrappers and plain tools both implement this; the
/// registry makes them available to the agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A delegation-shaped tool: free text in, free text out, the same
    /// surface a specialist agent presents to a coordinator.
    struct FlightDeskTool;

    #[async_trait]
    impl Tool for FlightDeskTool {
        fn name(&self) -> &str {
            "flight_desk"
        }
        fn description(&self) -> &str {
            "Searches and books flights from a plain-language request"
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
                return Err(ToolError::InvalidArguments("missing 'request'".into()));
            };
            Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Quoted 2 flights for: {request}"),
            })
        }
    }

    #[test]
    fn definition_mirrors_the_tool_surface() {
        let def = FlightDeskTool.to_definition();
        assert_eq!(def.name, "flight_desk");
        assert_eq!(def.parameters["required"][0], "request");
    }

    #[test]
    fn registering_the_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FlightDeskTool));
        registry.register(Box::new(FlightDeskTool));
        assert_eq!(registry.names(), vec!["flight_desk"]);
        assert_eq!(registry.definitions().len(), 1);
    }

    #[tokio::test]
    async fn dispatches_a_delegated_call() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FlightDeskTool));

        let call = ToolCall {
            id: "call_1".into(),
            name: "flight_desk".into(),
            arguments: serde_json::json!({"request": "LIS to OPO on Friday"}),
        };
        let result = registry.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "Quoted 2 flights for: LIS to OPO on Friday");
    }

    #[tokio::test]
    async fn unknown_tool_names_are_not_found() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        let call = ToolCall {
            id: "call_1".into(),
            name: "hotel_desk".into(),
            arguments: serde_json::json!({"request": "a room"}),
        };
        let err = registry.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "hotel_desk"));
    }
}
