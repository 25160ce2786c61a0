//! Server configuration loaded from environment variables via `envy`.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Each field maps to an unprefixed environment variable:
///   - `PORT`          (default `3000`)
///   - `BIND_ADDR`     (default `0.0.0.0`)
///   - `DOCKER_SOCKET` (default `/var/run/docker.sock`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path to the Docker daemon control socket.
    #[serde(default = "default_docker_socket")]
    pub docker_socket: String,
}

fn default_port() -> u16 {
    3000
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_docker_socket() -> String {
    "/var/run/docker.sock".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_addr: default_bind_addr(),
            docker_socket: default_docker_socket(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed,
    /// e.g. a non-numeric `PORT`.
    pub fn from_env() -> Result<Self> {
        envy::from_env().context("failed to load config from PORT / BIND_ADDR / DOCKER_SOCKET")
    }

    /// `host:port` string handed to the TCP listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
