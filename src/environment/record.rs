//! The per-environment config record: one ConfigMap in the control namespace.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

use crate::environment::model::{EnvironmentName, ProjectsConfig};
use crate::error::{Error, Result};

const DATA_KEY: &str = "environment";
const RECORD_TYPE: &str = "preview-environment-config";

pub fn record_name(environment: &EnvironmentName) -> String {
    format!("environment-config-{environment}")
}

pub fn to_config_map(
    environment: &EnvironmentName,
    control_namespace: &str,
    projects: &ProjectsConfig,
) -> Result<ConfigMap> {
    let labels = BTreeMap::from([
        ("type".to_string(), RECORD_TYPE.to_string()),
        ("environmentName".to_string(), environment.to_string()),
    ]);
    Ok(ConfigMap {
        metadata: ObjectMeta {
            name: Some(record_name(environment)),
            namespace: Some(control_namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            DATA_KEY.to_string(),
            serde_yaml::to_string(projects)?,
        )])),
        ..Default::default()
    })
}

pub fn from_config_map(config_map: &ConfigMap) -> Result<ProjectsConfig> {
    let encoded = config_map
        .data
        .as_ref()
        .and_then(|data| data.get(DATA_KEY))
        .ok_or_else(|| {
            Error::MissingEnvironmentData(config_map.metadata.name.clone().unwrap_or_default())
        })?;
    // An environment created without projects is stored as an empty document.
    if encoded.trim().is_empty() {
        return Ok(ProjectsConfig::new());
    }
    Ok(serde_yaml::from_str(encoded)?)
}
