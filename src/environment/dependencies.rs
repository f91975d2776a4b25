use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::environment::model::EnvironmentName;
use crate::environment::readiness::{pause, wait_for_ready, ReadinessConfig};
use crate::error::Result;
use crate::jobs::{run_all, Job, SharedJobRunner};
use crate::kubernetes::model::SharedK8sClient;

/// A Helm chart installed once per environment.
struct BackingService {
    job: &'static str,
    chart: &'static str,
    values: &'static [&'static str],
    /// `app` label of the pods to wait for, if any.
    ready_label: Option<&'static str>,
    /// Run from the local charts checkout instead of a chart repository.
    local_chart: bool,
}

const BACKING_SERVICES: [BackingService; 4] = [
    BackingService {
        job: "postgresql",
        chart: "stable/postgresql",
        values: &[
            "fullnameOverride=postgresql",
            "postgresqlDatabase=postgresql",
            "postgresqlPassword=password",
            "readinessProbe.initialDelaySeconds=60",
        ],
        ready_label: Some("postgresql"),
        local_chart: false,
    },
    BackingService {
        job: "rabbitmq",
        chart: "stable/rabbitmq-ha",
        values: &[
            "fullnameOverride=rabbitmq",
            "image.tag=3.7-management-alpine",
            "rbac.create=false",
            "replicaCount=1",
            "persistentVolume.enabled=true",
            "updateStrategy=RollingUpdate",
            "rabbitmqPassword=password",
            "rabbitmqMemoryHighWatermarkType=relative",
            "rabbitmqMemoryHighWatermark=0.5",
        ],
        ready_label: Some("rabbitmq-ha"),
        local_chart: false,
    },
    BackingService {
        job: "redis",
        chart: "stable/redis",
        values: &[
            "fullnameOverride=redis",
            "password=password",
            "cluster.enabled=false",
        ],
        ready_label: Some("redis"),
        local_chart: false,
    },
    BackingService {
        job: "telepresence",
        chart: "charts/telepresence",
        values: &[],
        ready_label: None,
        local_chart: true,
    },
];

pub struct DependencyConfig {
    /// Where local charts such as `charts/telepresence` are checked out.
    pub charts_dir: String,
    /// Grace period between the installs finishing and the first readiness poll.
    pub settle: Duration,
    pub readiness: ReadinessConfig,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        DependencyConfig {
            charts_dir: "/src".to_string(),
            settle: Duration::from_secs(10),
            readiness: ReadinessConfig::default(),
        }
    }
}

impl BackingService {
    fn install_job(&self, environment: &EnvironmentName, charts_dir: &str) -> Job {
        let mut command = format!(
            "helm upgrade {environment}-{} {} --install --namespace={environment}",
            self.job, self.chart
        );
        for value in self.values {
            command.push_str(" --set ");
            command.push_str(value);
        }

        let mut tasks = Vec::with_capacity(2);
        if self.local_chart {
            tasks.push(format!("cd {charts_dir}"));
        }
        tasks.push(command);
        Job::new(self.job, tasks)
    }
}

pub fn dependency_jobs(environment: &EnvironmentName, charts_dir: &str) -> Vec<Job> {
    BACKING_SERVICES
        .iter()
        .map(|service| service.install_job(environment, charts_dir))
        .collect()
}

/// Labels awaited after the installs, in order.
pub fn readiness_labels() -> Vec<&'static str> {
    BACKING_SERVICES
        .iter()
        .filter_map(|service| service.ready_label)
        .collect()
}

/// Installs or upgrades every backing service, then waits for them to run.
pub async fn deploy_dependencies(
    client: &SharedK8sClient,
    runner: &SharedJobRunner,
    environment: &EnvironmentName,
    config: &DependencyConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    info!(%environment, "Deploying dependencies");
    let jobs = dependency_jobs(environment, &config.charts_dir);
    run_all(runner, &jobs).await?;

    pause(config.settle, cancel).await?;
    for label in readiness_labels() {
        wait_for_ready(client, environment.as_str(), label, &config.readiness, cancel).await?;
    }
    info!(%environment, "Done deploying dependencies");
    Ok(())
}
