//! The memento agent layer.
//!
//! One invocation runs a sequential retrieve → invoke → save pipeline:
//!
//! 1. **Append** the user turn; registered hooks inject recalled context.
//! 2. **Send** system prompt + transcript to the LLM provider.
//! 3. **If tool calls**: execute tools, append results, loop back to 2.
//! 4. **If text**: append the assistant turn, fire completion hooks
//!    (the memory hook persists the exchange), return the text.
//!
//! Specialists are full agents exposed as tools; the coordinator is an
//! agent whose tools are specialists.

pub mod coordinator;
pub mod runner;
pub mod specialist;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use coordinator::Coordinator;
pub use runner::AgentRunner;
pub use specialist::{Specialist, SpecialistConfig};
