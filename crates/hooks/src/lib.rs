//! Conversation memory hooks for memento.
//!
//! [`MemoryHook`] subscribes to an agent's lifecycle events and performs
//! the two memory side effects: context injection before the model
//! responds, and persistence of the completed exchange afterwards.

pub mod memory_hook;

pub use memory_hook::MemoryHook;
