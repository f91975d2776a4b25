use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};
use std::sync::Arc;

/// The slice of the Kubernetes API used by environment lifecycle flows.
///
/// Errors are plain `kube::Error`s so callers can match on the apiserver
/// status code (409 for conflicts, 404 for missing objects).
#[async_trait]
pub trait K8sClient {
    async fn list_namespaces(&self, field_selector: &str) -> kube::Result<Vec<Namespace>>;

    async fn create_namespace(&self, namespace: &Namespace) -> kube::Result<()>;

    async fn delete_namespace(&self, name: &str) -> kube::Result<()>;

    async fn get_config_map(&self, namespace: &str, name: &str) -> kube::Result<ConfigMap>;

    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap)
        -> kube::Result<()>;

    async fn replace_config_map(
        &self,
        namespace: &str,
        name: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()>;

    async fn delete_config_map(&self, namespace: &str, name: &str) -> kube::Result<()>;

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> kube::Result<()>;

    async fn replace_secret(&self, namespace: &str, name: &str, secret: &Secret)
        -> kube::Result<()>;

    async fn list_pods(
        &self,
        namespace: &str,
        field_selector: &str,
        label_selector: &str,
    ) -> kube::Result<Vec<Pod>>;
}

pub type SharedK8sClient = Arc<dyn K8sClient + Send + Sync + 'static>;
