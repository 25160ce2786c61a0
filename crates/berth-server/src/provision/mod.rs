//! Container provisioning: turn a run request into a started container.
//!
//! Validation and normalization happen entirely in [`container`] before the
//! first daemon call; [`lifecycle`] then drives the created container to running.
//! A container that was created but failed to start is left in place for the
//! caller to delete.

pub mod container;
pub mod lifecycle;

use berth_api_types::RunImageRequest;
use thiserror::Error;

use crate::daemon::{DaemonError, RuntimeDaemon};
use crate::error::Result;

pub use container::{ContainerSpec, VolumeMount};
pub use lifecycle::{LifecycleStage, StageFailure, run_to_started};

/// A daemon call failed while provisioning.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct ProvisionError {
    /// Stage that was being entered.
    pub stage: LifecycleStage,
    /// Set once the create call succeeded; the container then still exists.
    pub container_id: Option<String>,
    #[source]
    pub source: DaemonError,
}

/// Validate `request`, create a container from `image_id` and run it.
///
/// Returns the daemon-assigned container id.
///
/// # Errors
///
/// [`ApiError::InvalidRequest`](crate::error::ApiError::InvalidRequest) when
/// the request is malformed (no daemon call is made), otherwise
/// [`ApiError::ProvisioningFailed`](crate::error::ApiError::ProvisioningFailed).
pub async fn provision(
    daemon: &dyn RuntimeDaemon,
    image_id: &str,
    request: RunImageRequest,
) -> Result<String> {
    tracing::info!(image = %image_id, ?request, "running image");

    let container = ContainerSpec::from_request(image_id, request).inspect_err(|err| {
        tracing::warn!(op = "run image", image = %image_id, error = %err, "rejected run request");
    })?;
    tracing::debug!(?container, "container spec");

    let id = daemon
        .create_container(container.name.clone(), container.to_config())
        .await
        .map_err(|source| ProvisionError {
            stage: LifecycleStage::Created,
            container_id: None,
            source,
        })
        .inspect_err(|err| log_failure(image_id, err))?;

    run_to_started(daemon, &id)
        .await
        .map_err(|failure| ProvisionError {
            stage: failure.stage,
            container_id: Some(id.clone()),
            source: failure.source,
        })
        .inspect_err(|err| log_failure(image_id, err))?;

    tracing::info!(image = %image_id, container_id = %id, "container started");
    Ok(id)
}

fn log_failure(image_id: &str, err: &ProvisionError) {
    tracing::error!(
        op = "run image",
        image = %image_id,
        stage = %err.stage,
        container_id = err.container_id.as_deref().unwrap_or(""),
        error = %err.source,
        "provisioning failed",
    );
}
