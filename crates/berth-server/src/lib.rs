//! Berth: REST façade over the Docker daemon for the container dashboard.
//!
//! Requests flow handler → orchestration operation ([`provision`] or
//! [`resources`]) → [`daemon::RuntimeDaemon`]. The daemon handle is injected
//! through the router state so tests can substitute a fake.

pub mod api;
pub mod config;
pub mod daemon;
pub mod docker;
pub mod error;
pub mod handlers;
pub mod provision;
pub mod resources;

pub use api::{AppState, create_router};
pub use config::ServerConfig;
pub use daemon::{DaemonError, ResourceKind, RuntimeDaemon};
pub use docker::BollardDaemon;
pub use error::ApiError;
