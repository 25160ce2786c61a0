//! Create → wait → attach → start sequencing for a freshly created container.
//!
//! Each transition is one awaited daemon call; the next call is never issued
//! before the previous one resolved.

use std::fmt;

use crate::daemon::{DaemonError, RuntimeDaemon};

/// Stage of a provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    /// The daemon accepted the create call.
    Created,
    /// The container reported ready.
    Waiting,
    /// Output streams are attached.
    Attached,
    /// The container was started.
    Started,
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "create",
            Self::Waiting => "wait",
            Self::Attached => "attach",
            Self::Started => "start",
        })
    }
}

/// The transition into `stage` failed.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: LifecycleStage,
    pub source: DaemonError,
}

/// Drive a created container from [`LifecycleStage::Created`] to
/// [`LifecycleStage::Started`].
///
/// # Errors
///
/// Returns the first failing transition. Earlier transitions are not undone.
pub async fn run_to_started(daemon: &dyn RuntimeDaemon, id: &str) -> Result<(), StageFailure> {
    let fail = |stage: LifecycleStage| move |source: DaemonError| StageFailure { stage, source };

    let mut stage = LifecycleStage::Created;
    loop {
        stage = match stage {
            LifecycleStage::Created => {
                daemon
                    .wait_container(id)
                    .await
                    .map_err(fail(LifecycleStage::Waiting))?;
                LifecycleStage::Waiting
            }
            LifecycleStage::Waiting => {
                daemon
                    .attach_container(id)
                    .await
                    .map_err(fail(LifecycleStage::Attached))?;
                LifecycleStage::Attached
            }
            LifecycleStage::Attached => {
                daemon
                    .start_container(id)
                    .await
                    .map_err(fail(LifecycleStage::Started))?;
                LifecycleStage::Started
            }
            LifecycleStage::Started => return Ok(()),
        };
        tracing::debug!(container_id = %id, stage = %stage, "lifecycle transition done");
    }
}
