//! Error types for the memento domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all memento operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Memory store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- LLM provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Agent errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the memory store collaborator.
///
/// Callers on the conversation path treat every variant as non-fatal:
/// memory is best-effort and the turn continues without it. Only resource
/// setup propagates these.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Memory resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Memory resource not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Max iterations ({0}) reached without a final answer")]
    MaxIterations(u32),

    #[error("Provider error during invocation: {0}")]
    Provider(#[from] ProviderError),

    #[error("Empty response from model")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_displays_correctly() {
        let err = Error::Store(StoreError::AlreadyExists("support-memory".into()));
        assert!(err.to_string().contains("support-memory"));
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn agent_error_wraps_provider_error() {
        let err = AgentError::Provider(ProviderError::RateLimited {
            retry_after_secs: 5,
        });
        assert!(err.to_string().contains("Rate limited"));
    }
}
