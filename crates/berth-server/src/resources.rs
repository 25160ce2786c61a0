//! Passthrough operations on images, containers, volumes and networks.
//!
//! Each operation is a single daemon call (volume delete: inspect then
//! remove) whose failure is logged and mapped onto [`ApiError`].

use berth_api_types::CreateVolumeRequest;
use bollard::models::{
    ContainerInspectResponse, ContainerSummary, ImageInspect, ImageSummary, Network, SystemInfo,
    Volume, VolumeListResponse,
};
use bollard::volume::CreateVolumeOptions;

use crate::daemon::{DaemonError, ResourceKind, RuntimeDaemon};
use crate::error::{ApiError, Result};

/// Driver used when a volume is created without one.
pub const DEFAULT_VOLUME_DRIVER: &str = "local";

// ── Images ────────────────────────────────────────────────────────────────────

pub async fn list_images(daemon: &dyn RuntimeDaemon) -> Result<Vec<ImageSummary>> {
    daemon
        .list_images()
        .await
        .map_err(|e| ApiError::from_daemon("fetch images", ResourceKind::Image, "", e))
}

pub async fn inspect_image(daemon: &dyn RuntimeDaemon, id: &str) -> Result<ImageInspect> {
    daemon
        .inspect_image(id)
        .await
        .map_err(|e| ApiError::from_daemon("fetch image", ResourceKind::Image, id, e))
}

pub async fn delete_image(daemon: &dyn RuntimeDaemon, id: &str) -> Result<()> {
    daemon
        .remove_image(id)
        .await
        .map_err(|e| ApiError::from_daemon("delete image", ResourceKind::Image, id, e))?;
    tracing::info!(image = %id, "image deleted");
    Ok(())
}

// ── Containers ────────────────────────────────────────────────────────────────

/// All containers, stopped and exited ones included.
pub async fn list_containers(daemon: &dyn RuntimeDaemon) -> Result<Vec<ContainerSummary>> {
    let containers = daemon
        .list_containers()
        .await
        .map_err(|e| ApiError::from_daemon("fetch containers", ResourceKind::Container, "", e))?;
    tracing::debug!(count = containers.len(), "fetched containers");
    Ok(containers)
}

pub async fn inspect_container(
    daemon: &dyn RuntimeDaemon,
    id: &str,
) -> Result<ContainerInspectResponse> {
    daemon
        .inspect_container(id)
        .await
        .map_err(|e| ApiError::from_daemon("fetch container", ResourceKind::Container, id, e))
}

pub async fn start_container(daemon: &dyn RuntimeDaemon, id: &str) -> Result<()> {
    daemon
        .start_container(id)
        .await
        .map_err(|e| ApiError::from_daemon("start container", ResourceKind::Container, id, e))?;
    tracing::info!(container_id = %id, "container started");
    Ok(())
}

pub async fn stop_container(daemon: &dyn RuntimeDaemon, id: &str) -> Result<()> {
    daemon
        .stop_container(id)
        .await
        .map_err(|e| ApiError::from_daemon("stop container", ResourceKind::Container, id, e))?;
    tracing::info!(container_id = %id, "container stopped");
    Ok(())
}

/// Remove a container. No pre-checks; a running container is refused by the
/// daemon and surfaces as a state conflict.
pub async fn delete_container(daemon: &dyn RuntimeDaemon, id: &str) -> Result<()> {
    daemon
        .remove_container(id)
        .await
        .map_err(|e| ApiError::from_daemon("delete container", ResourceKind::Container, id, e))?;
    tracing::info!(container_id = %id, "container deleted");
    Ok(())
}

// ── Volumes ───────────────────────────────────────────────────────────────────

pub async fn list_volumes(daemon: &dyn RuntimeDaemon) -> Result<VolumeListResponse> {
    daemon
        .list_volumes()
        .await
        .map_err(|e| ApiError::from_daemon("fetch volumes", ResourceKind::Volume, "", e))
}

pub async fn inspect_volume(daemon: &dyn RuntimeDaemon, name: &str) -> Result<Volume> {
    daemon
        .inspect_volume(name)
        .await
        .map_err(|e| ApiError::from_daemon("fetch volume", ResourceKind::Volume, name, e))
}

/// Create a volume, defaulting the driver to `local` and labels to none.
///
/// # Errors
///
/// [`ApiError::InvalidRequest`] for a blank name, otherwise the mapped
/// daemon failure.
pub async fn create_volume(
    daemon: &dyn RuntimeDaemon,
    request: CreateVolumeRequest,
) -> Result<Volume> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::InvalidRequest("Volume name is required".into()));
    }

    let options = CreateVolumeOptions {
        name: name.clone(),
        driver: request
            .driver
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VOLUME_DRIVER.to_string()),
        labels: request.labels.unwrap_or_default(),
        ..Default::default()
    };

    let volume = daemon
        .create_volume(options)
        .await
        .map_err(|e| ApiError::from_daemon("create volume", ResourceKind::Volume, &name, e))?;
    tracing::info!(volume = %volume.name, driver = %volume.driver, "volume created");
    Ok(volume)
}

/// Number of containers referencing `volume`, when the daemon reports it.
///
/// The daemon reports `-1` when usage was not computed; only a positive
/// count means the volume is in use.
#[must_use]
pub fn volume_ref_count(volume: &Volume) -> i64 {
    volume.usage_data.as_ref().map_or(0, |usage| usage.ref_count)
}

/// Delete a volume unless it is in use.
///
/// Inspects first and refuses with [`ApiError::ResourceInUse`] when the
/// reference count is positive. A consumer attaching between the inspect and
/// the remove is not detected; the daemon's own 409 is reported the same way.
pub async fn delete_volume(daemon: &dyn RuntimeDaemon, name: &str) -> Result<()> {
    let volume = daemon
        .inspect_volume(name)
        .await
        .map_err(|e| ApiError::from_daemon("delete volume", ResourceKind::Volume, name, e))?;

    let refs = volume_ref_count(&volume);
    if refs > 0 {
        tracing::warn!(volume = %name, ref_count = refs, "refusing to delete volume in use");
        return Err(ApiError::ResourceInUse {
            kind: ResourceKind::Volume,
            id: name.to_string(),
        });
    }

    match daemon.remove_volume(name).await {
        Ok(()) => {
            tracing::info!(volume = %name, "volume deleted");
            Ok(())
        }
        Err(DaemonError::Conflict(message)) => {
            tracing::warn!(volume = %name, error = %message, "daemon refused to delete volume in use");
            Err(ApiError::ResourceInUse {
                kind: ResourceKind::Volume,
                id: name.to_string(),
            })
        }
        Err(e) => Err(ApiError::from_daemon(
            "delete volume",
            ResourceKind::Volume,
            name,
            e,
        )),
    }
}

// ── Networks & system ─────────────────────────────────────────────────────────

pub async fn list_networks(daemon: &dyn RuntimeDaemon) -> Result<Vec<Network>> {
    daemon
        .list_networks()
        .await
        .map_err(|e| ApiError::from_daemon("fetch networks", ResourceKind::Network, "", e))
}

pub async fn system_info(daemon: &dyn RuntimeDaemon) -> Result<SystemInfo> {
    daemon
        .info()
        .await
        .map_err(|e| ApiError::from_daemon("fetch info", ResourceKind::System, "", e))
}
