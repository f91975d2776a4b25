use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::ObjectMeta;
use tracing::debug;

use crate::error::{Error, Result};
use crate::extensions::kube_error::KubeErrorExt;
use crate::kubernetes::model::SharedK8sClient;

fn target<'a>(kind: &'static str, metadata: &'a ObjectMeta) -> Result<(&'a str, &'a str)> {
    let name = metadata
        .name
        .as_deref()
        .ok_or(Error::MissingMetadata { kind, field: "name" })?;
    let namespace = metadata.namespace.as_deref().ok_or(Error::MissingMetadata {
        kind,
        field: "namespace",
    })?;
    Ok((namespace, name))
}

/// Creates the config map, replacing it wholesale if it already exists.
///
/// No resource version is sent with the replace, so the last writer wins.
pub async fn apply_config_map(client: &SharedK8sClient, config_map: &ConfigMap) -> Result<()> {
    let (namespace, name) = target("ConfigMap", &config_map.metadata)?;
    match client.create_config_map(namespace, config_map).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_conflict() => {
            debug!(%namespace, %name, "ConfigMap exists, replacing");
            client
                .replace_config_map(namespace, name, config_map)
                .await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Creates the secret, replacing it wholesale if it already exists. Last writer wins.
pub async fn apply_secret(client: &SharedK8sClient, secret: &Secret) -> Result<()> {
    let (namespace, name) = target("Secret", &secret.metadata)?;
    match client.create_secret(namespace, secret).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_conflict() => {
            debug!(%namespace, %name, "Secret exists, replacing");
            client.replace_secret(namespace, name, secret).await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
