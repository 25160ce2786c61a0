//! Port trait for the container runtime daemon.
//!
//! Orchestration code talks to the daemon only through [`RuntimeDaemon`], so
//! the production bollard client can be swapped for an in-memory fake or a
//! mock in tests.

use std::fmt;

use async_trait::async_trait;
use bollard::container::Config;
use bollard::models::{
    ContainerInspectResponse, ContainerSummary, ImageInspect, ImageSummary, Network, SystemInfo,
    Volume, VolumeListResponse,
};
use bollard::volume::CreateVolumeOptions;
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A failed daemon round-trip, classified by the status the daemon returned.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The daemon answered 404 for the given id or name.
    #[error("no such object: {0}")]
    NotFound(String),

    /// 409 (in use, name taken), or a start/stop of a container that is
    /// already in the requested state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other status code.
    #[error("daemon returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a daemon response (socket, transport, decoding).
    #[error("daemon unavailable: {0}")]
    Unavailable(String),
}

impl DaemonError {
    /// Classify a daemon status code and message.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Status { status, message },
        }
    }
}

impl From<bollard::errors::Error> for DaemonError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => Self::from_status(status_code, message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

// ── Resource kinds ────────────────────────────────────────────────────────────

/// The kinds of daemon object exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Container,
    Volume,
    Network,
    /// Daemon-wide information.
    System,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "Image",
            Self::Container => "Container",
            Self::Volume => "Volume",
            Self::Network => "Network",
            Self::System => "System",
        })
    }
}

// ── Daemon port ───────────────────────────────────────────────────────────────

/// Operations consumed from the runtime daemon.
///
/// Every method is attempted once. Start and stop report
/// [`DaemonError::Conflict`] when the container is already in the requested
/// state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuntimeDaemon: Send + Sync {
    /// Liveness check of the control socket.
    async fn ping(&self) -> Result<(), DaemonError>;

    async fn list_images(&self) -> Result<Vec<ImageSummary>, DaemonError>;
    async fn inspect_image(&self, id: &str) -> Result<ImageInspect, DaemonError>;
    async fn remove_image(&self, id: &str) -> Result<(), DaemonError>;

    /// List containers, including stopped and exited ones.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, DaemonError>;
    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, DaemonError>;
    /// Create a container and return the daemon-assigned id.
    async fn create_container(
        &self,
        name: Option<String>,
        config: Config<String>,
    ) -> Result<String, DaemonError>;
    /// Resolve once the container is in a ready (created, not running) state.
    async fn wait_container(&self, id: &str) -> Result<(), DaemonError>;
    /// Attach to stdout/stderr. The output is consumed in the background and
    /// never returned; this resolves once the attach is established.
    async fn attach_container(&self, id: &str) -> Result<(), DaemonError>;
    async fn start_container(&self, id: &str) -> Result<(), DaemonError>;
    async fn stop_container(&self, id: &str) -> Result<(), DaemonError>;
    async fn remove_container(&self, id: &str) -> Result<(), DaemonError>;

    async fn list_volumes(&self) -> Result<VolumeListResponse, DaemonError>;
    async fn inspect_volume(&self, name: &str) -> Result<Volume, DaemonError>;
    async fn create_volume(
        &self,
        options: CreateVolumeOptions<String>,
    ) -> Result<Volume, DaemonError>;
    async fn remove_volume(&self, name: &str) -> Result<(), DaemonError>;

    async fn list_networks(&self) -> Result<Vec<Network>, DaemonError>;

    /// Daemon-wide system information.
    async fn info(&self) -> Result<SystemInfo, DaemonError>;
}
