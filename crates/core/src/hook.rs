//! Lifecycle hooks — the bridge between agent turns and side effects.
//!
//! The runtime publishes two lifecycle events per invocation: a turn was
//! appended (before the model computes a response), and the invocation
//! completed (after the assistant turn landed). Hook providers subscribe
//! by implementing one method per event kind; the runtime invokes them
//! sequentially in registration order.
//!
//! A hook must never break the conversation: implementations catch their
//! own failures and degrade to a no-op for that turn.

use async_trait::async_trait;

use crate::transcript::Transcript;

/// A subscriber to agent lifecycle events.
///
/// Both methods default to no-ops so providers implement only the events
/// they care about.
#[async_trait]
pub trait HookProvider: Send + Sync {
    /// The hook name, for logging.
    fn name(&self) -> &str;

    /// Fired right after a new turn is appended and before the model
    /// computes a response. The transcript is mutable so the hook can
    /// enrich the latest turn with recalled context.
    async fn on_turn_appended(&self, _transcript: &mut Transcript) {}

    /// Fired after the agent appends its response turn.
    async fn on_invocation_completed(&self, _transcript: &Transcript) {}
}
