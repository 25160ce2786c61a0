//! [`RuntimeDaemon`] backed by the Docker Engine API over its unix socket.

use async_trait::async_trait;
use bollard::container::{
    AttachContainerOptions, AttachContainerResults, Config, CreateContainerOptions,
    ListContainersOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::image::ListImagesOptions;
use bollard::models::{
    ContainerInspectResponse, ContainerSummary, ImageInspect, ImageSummary, Network, SystemInfo,
    Volume, VolumeListResponse,
};
use bollard::network::ListNetworksOptions;
use bollard::volume::{CreateVolumeOptions, ListVolumesOptions};
use bollard::{API_DEFAULT_VERSION, Docker};
use futures::StreamExt;

use crate::daemon::{DaemonError, RuntimeDaemon};

/// Client timeout in seconds. Matches bollard's own default.
const CLIENT_TIMEOUT_SECS: u64 = 120;

/// Wait condition that resolves immediately for a freshly created container.
const WAIT_CONDITION: &str = "not-running";

/// Production daemon client.
#[derive(Clone)]
pub struct BollardDaemon {
    docker: Docker,
}

impl BollardDaemon {
    /// Open a client on the given unix socket path. Only the path's existence
    /// is checked here; use [`RuntimeDaemon::ping`] to verify the daemon answers.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::Unavailable`] if the socket file does not exist.
    pub fn connect(socket_path: &str) -> Result<Self, DaemonError> {
        let docker =
            Docker::connect_with_socket(socket_path, CLIENT_TIMEOUT_SECS, API_DEFAULT_VERSION)?;
        Ok(Self { docker })
    }

    /// Refuse a start or stop that would leave the container as it is.
    ///
    /// The daemon answers such a request with 304, which bollard reports as
    /// success, so the current state is read first.
    async fn ensure_state_change(&self, id: &str, to_running: bool) -> Result<(), DaemonError> {
        let inspect = self.docker.inspect_container(id, None).await?;
        let running = inspect
            .state
            .and_then(|state| state.running)
            .unwrap_or(false);
        if running == to_running {
            let current = if running { "running" } else { "stopped" };
            return Err(DaemonError::Conflict(format!(
                "container {id} is already {current}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RuntimeDaemon for BollardDaemon {
    async fn ping(&self) -> Result<(), DaemonError> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, DaemonError> {
        let options = ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        };
        Ok(self.docker.list_images(Some(options)).await?)
    }

    async fn inspect_image(&self, id: &str) -> Result<ImageInspect, DaemonError> {
        Ok(self.docker.inspect_image(id).await?)
    }

    async fn remove_image(&self, id: &str) -> Result<(), DaemonError> {
        let deleted = self.docker.remove_image(id, None, None).await?;
        tracing::debug!(image = %id, layers = deleted.len(), "image removed");
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, DaemonError> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        Ok(self.docker.list_containers(Some(options)).await?)
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, DaemonError> {
        Ok(self.docker.inspect_container(id, None).await?)
    }

    async fn create_container(
        &self,
        name: Option<String>,
        config: Config<String>,
    ) -> Result<String, DaemonError> {
        let options = name.map(|name| CreateContainerOptions {
            name,
            platform: None,
        });
        let response = self.docker.create_container(options, config).await?;
        for warning in &response.warnings {
            tracing::warn!(container_id = %response.id, "daemon warning: {warning}");
        }
        Ok(response.id)
    }

    async fn wait_container(&self, id: &str) -> Result<(), DaemonError> {
        let options = WaitContainerOptions {
            condition: WAIT_CONDITION.to_string(),
        };
        let mut stream = Box::pin(self.docker.wait_container(id, Some(options)));
        match stream.next().await {
            Some(Ok(response)) => {
                tracing::debug!(container_id = %id, status = response.status_code, "wait resolved");
                Ok(())
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        }
    }

    async fn attach_container(&self, id: &str) -> Result<(), DaemonError> {
        let options = AttachContainerOptions::<String> {
            stream: Some(true),
            stdout: Some(true),
            stderr: Some(true),
            ..Default::default()
        };
        let AttachContainerResults { mut output, .. } =
            self.docker.attach_container(id, Some(options)).await?;

        let container_id = id.to_string();
        tokio::spawn(async move {
            while let Some(chunk) = output.next().await {
                match chunk {
                    Ok(log) => tracing::debug!(container_id = %container_id, "{log}"),
                    Err(err) => {
                        tracing::debug!(container_id = %container_id, error = %err, "attach stream closed");
                        break;
                    }
                }
            }
        });
        Ok(())
    }

    async fn start_container(&self, id: &str) -> Result<(), DaemonError> {
        self.ensure_state_change(id, true).await?;
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<(), DaemonError> {
        self.ensure_state_change(id, false).await?;
        self.docker.stop_container(id, None).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<(), DaemonError> {
        self.docker.remove_container(id, None).await?;
        Ok(())
    }

    async fn list_volumes(&self) -> Result<VolumeListResponse, DaemonError> {
        Ok(self
            .docker
            .list_volumes(None::<ListVolumesOptions<String>>)
            .await?)
    }

    async fn inspect_volume(&self, name: &str) -> Result<Volume, DaemonError> {
        Ok(self.docker.inspect_volume(name).await?)
    }

    async fn create_volume(
        &self,
        options: CreateVolumeOptions<String>,
    ) -> Result<Volume, DaemonError> {
        Ok(self.docker.create_volume(options).await?)
    }

    async fn remove_volume(&self, name: &str) -> Result<(), DaemonError> {
        self.docker.remove_volume(name, None).await?;
        Ok(())
    }

    async fn list_networks(&self) -> Result<Vec<Network>, DaemonError> {
        Ok(self
            .docker
            .list_networks(None::<ListNetworksOptions<String>>)
            .await?)
    }

    async fn info(&self) -> Result<SystemInfo, DaemonError> {
        Ok(self.docker.info().await?)
    }
}
