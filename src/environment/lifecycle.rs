use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::environment::apply::{apply_config_map, apply_secret};
use crate::environment::dependencies::{deploy_dependencies, DependencyConfig};
use crate::environment::model::{overlay, EnvironmentName, ProjectOverrides, ProjectsConfig};
use crate::environment::namespace::ensure_namespace;
use crate::environment::projects::ProjectDeployer;
use crate::environment::record;
use crate::error::Result;
use crate::extensions::kube_error::KubeErrorExt;
use crate::jobs::{Job, SharedJobRunner};
use crate::kubernetes::model::SharedK8sClient;

/// Config maps and secrets copied into every new environment.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SharedResources {
    #[serde(default)]
    pub config_maps: Vec<ConfigMap>,
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

pub struct LifecycleConfig {
    pub control_namespace: String,
    pub dependencies: DependencyConfig,
    /// Projects every environment starts from before event overrides apply.
    pub baseline: ProjectsConfig,
    pub shared: SharedResources,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        LifecycleConfig {
            control_namespace: "brigade".to_string(),
            dependencies: DependencyConfig::default(),
            baseline: ProjectsConfig::new(),
            shared: SharedResources::default(),
        }
    }
}

pub struct Lifecycle {
    client: SharedK8sClient,
    runner: SharedJobRunner,
    projects: ProjectDeployer,
    config: LifecycleConfig,
    cancel: CancellationToken,
}

impl Lifecycle {
    pub fn new(
        client: SharedK8sClient,
        runner: SharedJobRunner,
        projects: ProjectDeployer,
        config: LifecycleConfig,
        cancel: CancellationToken,
    ) -> Lifecycle {
        Lifecycle {
            client,
            runner,
            projects,
            config,
            cancel,
        }
    }

    pub fn control_namespace(&self) -> &str {
        &self.config.control_namespace
    }

    #[instrument(skip_all, fields(environment = %environment))]
    pub async fn provision(
        &self,
        environment: &EnvironmentName,
        overrides: &ProjectOverrides,
    ) -> Result<()> {
        let projects = overlay(&self.config.baseline, overrides)?;

        ensure_namespace(&self.client, environment.as_str()).await?;
        self.write_record(environment, &projects).await?;
        self.apply_shared_resources(environment).await?;
        deploy_dependencies(
            &self.client,
            &self.runner,
            environment,
            &self.config.dependencies,
            &self.cancel,
        )
        .await?;
        self.projects.deploy_projects(environment).await?;
        info!("Environment provisioned");
        Ok(())
    }

    /// Rewrites the config record and redeploys projects. Namespace and backing services stay.
    #[instrument(skip_all, fields(environment = %environment))]
    pub async fn refresh(
        &self,
        environment: &EnvironmentName,
        overrides: &ProjectOverrides,
    ) -> Result<()> {
        let base = self.current_projects(environment).await?;
        let projects = overlay(&base, overrides)?;

        self.write_record(environment, &projects).await?;
        self.projects.deploy_projects(environment).await?;
        info!("Environment refreshed");
        Ok(())
    }

    /// Removes every Helm release whose name contains the environment name, then the
    /// namespace, then the config record. Steps already done are skipped, so a failed
    /// destroy can be run again.
    #[instrument(skip_all, fields(environment = %environment))]
    pub async fn destroy(&self, environment: &EnvironmentName) -> Result<()> {
        self.runner.run(&release_cleanup_job(environment)).await?;
        match self.client.delete_namespace(environment.as_str()).await {
            Err(err) if err.is_not_found() => info!("Namespace already gone"),
            other => other?,
        }
        let record_name = record::record_name(environment);
        match self
            .client
            .delete_config_map(&self.config.control_namespace, &record_name)
            .await
        {
            Err(err) if err.is_not_found() => info!(%record_name, "Config record already gone"),
            other => other?,
        }
        info!("Environment destroyed");
        Ok(())
    }

    async fn current_projects(&self, environment: &EnvironmentName) -> Result<ProjectsConfig> {
        let existing = self
            .client
            .get_config_map(
                &self.config.control_namespace,
                &record::record_name(environment),
            )
            .await;
        match existing {
            Ok(config_map) => record::from_config_map(&config_map),
            Err(err) if err.is_not_found() => Ok(self.config.baseline.clone()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_record(
        &self,
        environment: &EnvironmentName,
        projects: &ProjectsConfig,
    ) -> Result<()> {
        info!(projects = projects.len(), "Writing environment config");
        let config_map =
            record::to_config_map(environment, &self.config.control_namespace, projects)?;
        apply_config_map(&self.client, &config_map).await
    }

    async fn apply_shared_resources(&self, environment: &EnvironmentName) -> Result<()> {
        for config_map in &self.config.shared.config_maps {
            let mut config_map = config_map.clone();
            config_map.metadata.namespace = Some(environment.to_string());
            apply_config_map(&self.client, &config_map).await?;
        }
        for secret in &self.config.shared.secrets {
            let mut secret = secret.clone();
            secret.metadata.namespace = Some(environment.to_string());
            apply_secret(&self.client, &secret).await?;
        }
        Ok(())
    }
}

/// Deletes the releases whose name contains the environment name. Succeeds when none match.
pub fn release_cleanup_job(environment: &EnvironmentName) -> Job {
    Job::new(
        "helm-delete",
        vec![
            format!("releases=$(helm list --short | grep -F -- '{environment}' || true)"),
            "[ -z \"$releases\" ] || helm delete $releases --purge".to_string(),
        ],
    )
}
