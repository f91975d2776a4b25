use async_trait::async_trait;

use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};

use crate::kubernetes::model::K8sClient;

pub struct KubeRsBased {
    client: Client,
}

impl KubeRsBased {
    pub fn new(client: Client) -> KubeRsBased {
        KubeRsBased { client }
    }

    /// Uses the local kubeconfig, or the in-cluster service account when running as a pod.
    pub async fn try_default() -> kube::Result<KubeRsBased> {
        Ok(KubeRsBased::new(Client::try_default().await?))
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl K8sClient for KubeRsBased {
    async fn list_namespaces(&self, field_selector: &str) -> kube::Result<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default().fields(field_selector)).await?;
        Ok(list.items)
    }

    async fn create_namespace(&self, namespace: &Namespace) -> kube::Result<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.create(&PostParams::default(), namespace).await?;
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> kube::Result<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> kube::Result<ConfigMap> {
        self.namespaced::<ConfigMap>(namespace).get(name).await
    }

    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()> {
        self.namespaced::<ConfigMap>(namespace)
            .create(&PostParams::default(), config_map)
            .await?;
        Ok(())
    }

    async fn replace_config_map(
        &self,
        namespace: &str,
        name: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()> {
        self.namespaced::<ConfigMap>(namespace)
            .replace(name, &PostParams::default(), config_map)
            .await?;
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> kube::Result<()> {
        self.namespaced::<ConfigMap>(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> kube::Result<()> {
        self.namespaced::<Secret>(namespace)
            .create(&PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn replace_secret(
        &self,
        namespace: &str,
        name: &str,
        secret: &Secret,
    ) -> kube::Result<()> {
        self.namespaced::<Secret>(namespace)
            .replace(name, &PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        field_selector: &str,
        label_selector: &str,
    ) -> kube::Result<Vec<Pod>> {
        let params = ListParams::default()
            .fields(field_selector)
            .labels(label_selector);
        let pods = self.namespaced::<Pod>(namespace).list(&params).await?;
        Ok(pods.items)
    }
}
