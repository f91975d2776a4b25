use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{Error, Result};
use crate::kubernetes::model::SharedK8sClient;

const RUNNING_PHASE: &str = "status.phase=Running";

#[derive(Clone, Debug)]
pub struct ReadinessConfig {
    pub poll_interval: Duration,
    /// `None` waits for as long as it takes.
    pub timeout: Option<Duration>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        ReadinessConfig {
            poll_interval: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(900)),
        }
    }
}

/// Sleeps for `duration` unless the token is cancelled first.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Polls until at least one `app=<label>` pod in the namespace is `Running`.
pub async fn wait_for_ready(
    client: &SharedK8sClient,
    namespace: &str,
    label: &str,
    config: &ReadinessConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let label_selector = format!("app={label}");
    let started = Instant::now();

    loop {
        let pods = client
            .list_pods(namespace, RUNNING_PHASE, &label_selector)
            .await?;
        if !pods.is_empty() {
            info!(%namespace, %label, "Pod is ready");
            return Ok(());
        }

        let waited = started.elapsed();
        if let Some(timeout) = config.timeout {
            if waited + config.poll_interval > timeout {
                return Err(Error::DeploymentTimedOut {
                    namespace: namespace.to_string(),
                    label: label.to_string(),
                    waited,
                });
            }
        }

        info!(%namespace, %label, "Waiting for pod to be ready");
        pause(config.poll_interval, cancel).await?;
    }
}
