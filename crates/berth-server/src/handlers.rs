//! Request handlers. Each one extracts its inputs, calls the matching
//! orchestration operation and shapes the HTTP response.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use berth_api_types::{CreateVolumeRequest, MessageResponse, RunImageRequest, RunImageResponse};
use bollard::models::{
    ContainerInspectResponse, ContainerSummary, ImageInspect, ImageSummary, Network, SystemInfo,
    Volume, VolumeListResponse,
};
use serde::de::DeserializeOwned;

use crate::api::AppState;
use crate::error::{ApiError, Result};
use crate::{provision, resources};

/// Parse a JSON body; an empty body is the type's default.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid request body: {e}")))
}

/// Minimal health-check handler for load-balancer probes.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ============================================================================
// Images
// ============================================================================

pub async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<ImageSummary>>> {
    Ok(Json(resources::list_images(state.daemon()).await?))
}

pub async fn inspect_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageInspect>> {
    Ok(Json(resources::inspect_image(state.daemon(), &id).await?))
}

/// Create and start a container from an image.
pub async fn run_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<RunImageResponse>)> {
    let request: RunImageRequest = parse_body(&body)?;
    let container_id = provision::provision(state.daemon(), &id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RunImageResponse {
            message: "Container started".to_string(),
            container_id,
        }),
    ))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    resources::delete_image(state.daemon(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Containers
// ============================================================================

pub async fn list_containers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContainerSummary>>> {
    Ok(Json(resources::list_containers(state.daemon()).await?))
}

pub async fn inspect_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContainerInspectResponse>> {
    Ok(Json(resources::inspect_container(state.daemon(), &id).await?))
}

pub async fn start_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    resources::start_container(state.daemon(), &id).await?;
    Ok(Json(MessageResponse::new("Container started successfully")))
}

pub async fn stop_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    resources::stop_container(state.daemon(), &id).await?;
    Ok(Json(MessageResponse::new("Container stopped successfully")))
}

pub async fn delete_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    resources::delete_container(state.daemon(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Volumes
// ============================================================================

pub async fn list_volumes(State(state): State<AppState>) -> Result<Json<VolumeListResponse>> {
    Ok(Json(resources::list_volumes(state.daemon()).await?))
}

pub async fn inspect_volume(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Volume>> {
    Ok(Json(resources::inspect_volume(state.daemon(), &name).await?))
}

pub async fn create_volume(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Volume>)> {
    let request: CreateVolumeRequest = parse_body(&body)?;
    let volume = resources::create_volume(state.daemon(), request).await?;
    Ok((StatusCode::CREATED, Json(volume)))
}

/// Delete a volume; refused with 400 while it is in use.
pub async fn delete_volume(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    resources::delete_volume(state.daemon(), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Networks & system
// ============================================================================

pub async fn list_networks(State(state): State<AppState>) -> Result<Json<Vec<Network>>> {
    Ok(Json(resources::list_networks(state.daemon()).await?))
}

pub async fn get_info(State(state): State<AppState>) -> Result<Json<SystemInfo>> {
    Ok(Json(resources::system_info(state.daemon()).await?))
}
