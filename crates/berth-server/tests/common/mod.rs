//! In-memory [`RuntimeDaemon`] for router-level tests.
//!
//! Keeps just enough state (images, containers, volumes) to exercise the
//! API end to end, and counts calls so tests can assert that rejected
//! requests never reached the daemon.

#![allow(clippy::expect_used, dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use berth_server::{DaemonError, RuntimeDaemon, create_router};
use bollard::container::Config;
use bollard::models::{
    ContainerInspectResponse, ContainerState, ContainerSummary, ImageInspect, ImageSummary,
    Network, SystemInfo, Volume, VolumeListResponse, VolumeUsageData,
};
use bollard::volume::CreateVolumeOptions;
use http_body_util::BodyExt;
use tower::ServiceExt;

struct FakeContainer {
    name: String,
    config: Config<String>,
    running: bool,
}

#[derive(Default)]
struct FakeState {
    images: Vec<String>,
    containers: BTreeMap<String, FakeContainer>,
    volumes: BTreeMap<String, Volume>,
    next_id: u64,
    calls: usize,
    down: bool,
}

#[derive(Clone, Default)]
pub struct FakeDaemon {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDaemon {
    /// A daemon that knows `alpine:latest` and `nginx:latest`.
    pub fn new() -> Self {
        let daemon = Self::default();
        daemon.lock().images = vec!["alpine:latest".into(), "nginx:latest".into()];
        daemon
    }

    /// A daemon whose socket is gone: every call fails before a response.
    pub fn unavailable() -> Self {
        let daemon = Self::default();
        daemon.lock().down = true;
        daemon
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake daemon state poisoned")
    }

    /// Count a call and fail it when the daemon is down.
    fn enter(&self) -> Result<MutexGuard<'_, FakeState>, DaemonError> {
        let mut state = self.lock();
        state.calls += 1;
        if state.down {
            return Err(DaemonError::Unavailable(
                "connect: no such file or directory".into(),
            ));
        }
        Ok(state)
    }

    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    pub fn container_count(&self) -> usize {
        self.lock().containers.len()
    }

    pub fn set_ref_count(&self, volume: &str, ref_count: i64) {
        let mut state = self.lock();
        let volume = state.volumes.get_mut(volume).expect("volume exists");
        volume.usage_data = Some(VolumeUsageData { size: 0, ref_count });
    }

    pub fn router(&self) -> Router {
        create_router(Arc::new(self.clone()))
    }
}

fn resolve_image<'a>(images: &'a [String], reference: &str) -> Option<&'a String> {
    images
        .iter()
        .find(|tag| *tag == reference || tag.split(':').next() == Some(reference))
}

fn not_found(what: &str, id: &str) -> DaemonError {
    DaemonError::from_status(404, format!("No such {what}: {id}"))
}

#[async_trait]
impl RuntimeDaemon for FakeDaemon {
    async fn ping(&self) -> Result<(), DaemonError> {
        self.enter().map(|_| ())
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, DaemonError> {
        let state = self.enter()?;
        Ok(state
            .images
            .iter()
            .map(|tag| ImageSummary {
                id: format!("sha256:{tag}"),
                repo_tags: vec![tag.clone()],
                ..Default::default()
            })
            .collect())
    }

    async fn inspect_image(&self, id: &str) -> Result<ImageInspect, DaemonError> {
        let state = self.enter()?;
        let tag = resolve_image(&state.images, id).ok_or_else(|| not_found("image", id))?;
        Ok(ImageInspect {
            id: Some(format!("sha256:{tag}")),
            repo_tags: Some(vec![tag.clone()]),
            ..Default::default()
        })
    }

    async fn remove_image(&self, id: &str) -> Result<(), DaemonError> {
        let mut state = self.enter()?;
        let tag = resolve_image(&state.images, id)
            .cloned()
            .ok_or_else(|| not_found("image", id))?;
        state.images.retain(|t| *t != tag);
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, DaemonError> {
        let state = self.enter()?;
        Ok(state
            .containers
            .iter()
            .map(|(id, c)| ContainerSummary {
                id: Some(id.clone()),
                names: Some(vec![format!("/{}", c.name)]),
                image: c.config.image.clone(),
                ..Default::default()
            })
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, DaemonError> {
        let state = self.enter()?;
        let c = state
            .containers
            .get(id)
            .ok_or_else(|| not_found("container", id))?;
        Ok(ContainerInspectResponse {
            id: Some(id.to_string()),
            name: Some(format!("/{}", c.name)),
            image: c.config.image.clone(),
            host_config: c.config.host_config.clone(),
            state: Some(ContainerState {
                running: Some(c.running),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    async fn create_container(
        &self,
        name: Option<String>,
        config: Config<String>,
    ) -> Result<String, DaemonError> {
        let mut state = self.enter()?;
        let image = config.image.clone().unwrap_or_default();
        if resolve_image(&state.images, &image).is_none() {
            return Err(not_found("image", &image));
        }
        state.next_id += 1;
        let id = format!("{:012x}", 0xc0ffee_u64 + state.next_id);
        let name = name.unwrap_or_else(|| format!("fake_{}", state.next_id));
        if state.containers.values().any(|c| c.name == name) {
            return Err(DaemonError::from_status(
                409,
                format!("Conflict. The container name \"/{name}\" is already in use"),
            ));
        }
        state.containers.insert(
            id.clone(),
            FakeContainer {
                name,
                config,
                running: false,
            },
        );
        Ok(id)
    }

    async fn wait_container(&self, id: &str) -> Result<(), DaemonError> {
        let state = self.enter()?;
        state
            .containers
            .get(id)
            .map(|_| ())
            .ok_or_else(|| not_found("container", id))
    }

    async fn attach_container(&self, id: &str) -> Result<(), DaemonError> {
        let state = self.enter()?;
        state
            .containers
            .get(id)
            .map(|_| ())
            .ok_or_else(|| not_found("container", id))
    }

    async fn start_container(&self, id: &str) -> Result<(), DaemonError> {
        let mut state = self.enter()?;
        let c = state
            .containers
            .get_mut(id)
            .ok_or_else(|| not_found("container", id))?;
        if c.running {
            return Err(DaemonError::Conflict(format!("container {id} is already running")));
        }
        c.running = true;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<(), DaemonError> {
        let mut state = self.enter()?;
        let c = state
            .containers
            .get_mut(id)
            .ok_or_else(|| not_found("container", id))?;
        if !c.running {
            return Err(DaemonError::Conflict(format!("container {id} is already stopped")));
        }
        c.running = false;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<(), DaemonError> {
        let mut state = self.enter()?;
        let running = state
            .containers
            .get(id)
            .map(|c| c.running)
            .ok_or_else(|| not_found("container", id))?;
        if running {
            return Err(DaemonError::from_status(
                409,
                "cannot remove a running container",
            ));
        }
        state.containers.remove(id);
        Ok(())
    }

    async fn list_volumes(&self) -> Result<VolumeListResponse, DaemonError> {
        let state = self.enter()?;
        Ok(VolumeListResponse {
            volumes: Some(state.volumes.values().cloned().collect()),
            ..Default::default()
        })
    }

    async fn inspect_volume(&self, name: &str) -> Result<Volume, DaemonError> {
        let state = self.enter()?;
        state
            .volumes
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("volume", name))
    }

    async fn create_volume(
        &self,
        options: CreateVolumeOptions<String>,
    ) -> Result<Volume, DaemonError> {
        let mut state = self.enter()?;
        let volume = Volume {
            name: options.name.clone(),
            driver: options.driver,
            labels: options.labels,
            mountpoint: format!("/var/lib/docker/volumes/{}/_data", options.name),
            usage_data: Some(VolumeUsageData {
                size: 0,
                ref_count: 0,
            }),
            ..Default::default()
        };
        state.volumes.insert(options.name, volume.clone());
        Ok(volume)
    }

    async fn remove_volume(&self, name: &str) -> Result<(), DaemonError> {
        let mut state = self.enter()?;
        state
            .volumes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found("volume", name))
    }

    async fn list_networks(&self) -> Result<Vec<Network>, DaemonError> {
        self.enter()?;
        Ok(["bridge", "host", "none"]
            .into_iter()
            .map(|name| Network {
                name: Some(name.to_string()),
                driver: Some(if name == "none" { "null" } else { name }.to_string()),
                ..Default::default()
            })
            .collect())
    }

    async fn info(&self) -> Result<SystemInfo, DaemonError> {
        let state = self.enter()?;
        let running = state.containers.values().filter(|c| c.running).count();
        Ok(SystemInfo {
            containers: i64::try_from(state.containers.len()).ok(),
            containers_running: i64::try_from(running).ok(),
            images: i64::try_from(state.images.len()).ok(),
            server_version: Some("fake-27.0".to_string()),
            driver: Some("overlay2".to_string()),
            ..Default::default()
        })
    }
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, json)
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
