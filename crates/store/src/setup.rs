//! Resource setup and teardown.
//!
//! Setup is the one place where store errors are fatal to a run, so it
//! gets the careful treatment: create-or-resolve is idempotent, and an
//! unexpected failure cleans up any partially created resource before
//! propagating.

use memento_core::error::StoreError;
use memento_core::store::{MemoryResource, MemoryStore, ResourceSpec};
use tracing::{info, warn};

/// Ensure a memory resource with the given spec exists.
///
/// Idempotent: if the name is already taken, the existing resource is
/// resolved by name and returned, so two calls with the same spec yield
/// the same resource id.
pub async fn ensure_resource(
    store: &dyn MemoryStore,
    spec: ResourceSpec,
) -> Result<MemoryResource, StoreError> {
    let name = spec.name.clone();
    match store.create_resource(spec).await {
        Ok(resource) => {
            info!(name = %resource.name, id = %resource.id, "Created memory resource");
            Ok(resource)
        }
        Err(StoreError::AlreadyExists(_)) => {
            let existing = store
                .list_resources()
                .await?
                .into_iter()
                .find(|r| r.name == name)
                .ok_or_else(|| {
                    StoreError::Protocol(format!(
                        "store reported '{name}' exists but it is not listed"
                    ))
                })?;
            info!(name = %existing.name, id = %existing.id, "Reusing existing memory resource");
            Ok(existing)
        }
        Err(e) => {
            // A create that failed mid-flight may have left a live resource
            // behind. Clean it up best-effort before surfacing the error.
            if let Ok(resources) = store.list_resources().await {
                if let Some(partial) = resources.into_iter().find(|r| r.name == name) {
                    warn!(id = %partial.id, "Cleaning up partially created resource");
                    if let Err(cleanup_err) = store.delete_resource(&partial.id).await {
                        warn!(error = %cleanup_err, "Cleanup failed");
                    }
                }
            }
            Err(e)
        }
    }
}

/// Delete a resource, logging (not raising) a failure.
pub async fn teardown(store: &dyn MemoryStore, resource_id: &str) -> Result<(), StoreError> {
    match store.delete_resource(resource_id).await {
        Ok(()) => {
            info!(id = resource_id, "Deleted memory resource");
            Ok(())
        }
        Err(e) => {
            warn!(id = resource_id, error = %e, "Teardown failed");
            Err(e)
        }
    }
}
