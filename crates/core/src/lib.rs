//! # Memento Core
//!
//! Domain types, traits, and error definitions for the memento conversational
//! memory layer. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here: the memory store,
//! the LLM provider, the tools a coordinator can call, and the lifecycle
//! hooks that bridge agent turns to the store. Implementations live in their
//! respective crates, which keeps the dependency graph pointing inward and
//! makes every seam mockable in tests.

pub mod error;
pub mod event;
pub mod hook;
pub mod identity;
pub mod provider;
pub mod store;
pub mod tool;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, Error, ProviderError, Result, StoreError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use hook::HookProvider;
pub use identity::{ActorId, Namespace, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use store::{
    EventTurn, ExtractionStrategy, MemoryRecord, MemoryResource, MemoryStore, ResourceSpec,
};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
pub use transcript::{Role, Transcript, Turn, TurnKind, find_last_exchange};
