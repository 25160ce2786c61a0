//! Normalization of a run request into a [`ContainerSpec`].
//!
//! All checks run before anything is sent to the daemon; the first malformed
//! field rejects the whole request.

use std::collections::HashMap;

use berth_api_types::RunImageRequest;
use bollard::container::Config;
use bollard::models::{HostConfig, PortBinding};

use crate::error::ApiError;

/// A `host:container` bind mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host: String,
    pub container: String,
}

impl VolumeMount {
    /// Parse `host:container`. Exactly one `:` and both sides non-empty.
    /// Surrounding whitespace is trimmed from each side, so `" /a : /b "`
    /// is the same mount as `"/a:/b"`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for any other shape.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut parts = raw.split(':').map(str::trim);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(host), Some(container), None) if !host.is_empty() && !container.is_empty() => {
                Ok(Self {
                    host: host.to_string(),
                    container: container.to_string(),
                })
            }
            _ => Err(ApiError::InvalidRequest(format!(
                "Invalid volume mount format: {raw}. Expected format is 'host:container'."
            ))),
        }
    }

    /// Bind string as the daemon expects it.
    #[must_use]
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.container)
    }
}

/// Normalized, validated description of a container to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub name: Option<String>,
    /// Empty means the image's default command.
    pub command: Vec<String>,
    /// Published on the same host port.
    pub exposed_port: Option<String>,
    pub env_vars: Vec<String>,
    pub volume_mounts: Vec<VolumeMount>,
}

impl ContainerSpec {
    /// Build a container spec from the image path segment and the request body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the image is blank, an
    /// environment entry lacks `=`, or a volume mount is not `host:container`.
    pub fn from_request(image_id: &str, request: RunImageRequest) -> Result<Self, ApiError> {
        let image = image_id.trim();
        if image.is_empty() {
            return Err(ApiError::InvalidRequest("Image name is required".into()));
        }

        let name = request.container_name.filter(|n| !n.trim().is_empty());

        let command = request
            .command
            .as_deref()
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let exposed_port = request
            .port
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let env_vars = request
            .env_vars
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .map(parse_env_var)
            .collect::<Result<Vec<_>, _>>()?;

        let volume_mounts = request
            .volume_mounts
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .map(VolumeMount::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            image: image.to_string(),
            name,
            command,
            exposed_port,
            env_vars,
            volume_mounts,
        })
    }

    /// Port key in the daemon's `port/proto` notation.
    fn port_key(&self) -> Option<String> {
        self.exposed_port.as_ref().map(|p| format!("{p}/tcp"))
    }

    /// Render the create-container configuration sent to the daemon.
    #[must_use]
    pub fn to_config(&self) -> Config<String> {
        let exposed_ports = self
            .port_key()
            .map(|key| HashMap::from([(key, HashMap::new())]));

        let port_bindings = match (self.port_key(), &self.exposed_port) {
            (Some(key), Some(port)) => HashMap::from([(
                key,
                Some(vec![PortBinding {
                    host_ip: None,
                    host_port: Some(port.clone()),
                }]),
            )]),
            _ => HashMap::new(),
        };

        let volumes: HashMap<String, HashMap<(), ()>> = self
            .volume_mounts
            .iter()
            .map(|m| (m.container.clone(), HashMap::new()))
            .collect();

        let binds: Vec<String> = self.volume_mounts.iter().map(VolumeMount::bind).collect();

        Config {
            image: Some(self.image.clone()),
            tty: Some(true),
            cmd: (!self.command.is_empty()).then(|| self.command.clone()),
            exposed_ports,
            env: Some(self.env_vars.clone()),
            volumes: (!volumes.is_empty()).then_some(volumes),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                binds: Some(binds),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

fn parse_env_var(raw: &str) -> Result<String, ApiError> {
    if raw.contains('=') {
        Ok(raw.trim().to_string())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "Invalid environment variable format: {raw}. Expected format is 'key=value'."
        )))
    }
}
