use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::environment::dependencies::DependencyConfig;
use crate::environment::lifecycle::{LifecycleConfig, SharedResources};
use crate::environment::model::ProjectsConfig;
use crate::environment::readiness::ReadinessConfig;
use crate::jobs::script;
use crate::repository::github::DEFAULT_API_URL;

// YAML specific configuration

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub control_namespace: String,
    pub repository_api_url: String,
    #[serde(deserialize_with = "positive_secs")]
    pub poll_interval_secs: u64,
    /// `null` lets readiness waits run unbounded.
    pub readiness_timeout_secs: Option<u64>,
    pub dependency_settle_secs: u64,
    pub charts_dir: String,
    pub job_envs: HashMap<String, String>,
    pub baseline_path: Option<PathBuf>,
    pub shared_resources_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            control_namespace: "brigade".to_string(),
            repository_api_url: DEFAULT_API_URL.to_string(),
            poll_interval_secs: 5,
            readiness_timeout_secs: Some(900),
            dependency_settle_secs: 10,
            charts_dir: "/src".to_string(),
            job_envs: HashMap::new(),
            baseline_path: None,
            shared_resources_path: None,
        }
    }
}

fn positive_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    if secs == 0 {
        return Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Unsigned(0),
            &"at least one second",
        ));
    }
    Ok(secs)
}

pub fn load_from_yaml<T, P>(path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let conf_file = std::fs::File::open(path)?;
    // Workaround for merge anchors.
    // https://github.com/dtolnay/serde-yaml/issues/317
    let mut yaml_value: serde_yaml::Value = serde_yaml::from_reader(conf_file)?;
    yaml_value.apply_merge()?;
    Ok(serde_yaml::from_value(yaml_value)?)
}

// Parsed part - from settings to application specific

impl Settings {
    pub fn job_runner_config(&self) -> script::Config {
        script::Config {
            envs: self.job_envs.clone(),
            ..script::Config::default()
        }
    }

    pub fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: self.readiness_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Reads the baseline and shared resource files, when configured.
    pub fn lifecycle_config(&self) -> anyhow::Result<LifecycleConfig> {
        let baseline: ProjectsConfig = match &self.baseline_path {
            Some(path) => load_from_yaml(path)?,
            None => ProjectsConfig::new(),
        };
        let shared: SharedResources = match &self.shared_resources_path {
            Some(path) => load_from_yaml(path)?,
            None => SharedResources::default(),
        };

        Ok(LifecycleConfig {
            control_namespace: self.control_namespace.clone(),
            dependencies: DependencyConfig {
                charts_dir: self.charts_dir.clone(),
                settle: Duration::from_secs(self.dependency_settle_secs),
                readiness: self.readiness(),
            },
            baseline,
            shared,
        })
    }
}
