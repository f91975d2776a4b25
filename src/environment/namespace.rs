use k8s_openapi::api::core::v1::Namespace;
use kube::api::ObjectMeta;
use tracing::info;

use crate::error::Result;
use crate::kubernetes::model::SharedK8sClient;

/// Creates the namespace unless one with exactly this name is already listed.
pub async fn ensure_namespace(client: &SharedK8sClient, name: &str) -> Result<()> {
    let existing = client
        .list_namespaces(&format!("metadata.name={name}"))
        .await?;
    if !existing.is_empty() {
        info!(namespace = %name, "Namespace already exists");
        return Ok(());
    }

    info!(namespace = %name, "Creating namespace");
    let namespace = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    client.create_namespace(&namespace).await?;
    info!(namespace = %name, "Namespace created");
    Ok(())
}
