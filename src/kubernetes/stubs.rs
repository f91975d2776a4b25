use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};
use kube::api::ObjectMeta;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::extensions::kube_error::api_error;
use crate::kubernetes::model::K8sClient;

#[derive(Default)]
struct State {
    namespaces: BTreeSet<String>,
    config_maps: BTreeMap<(String, String), ConfigMap>,
    secrets: BTreeMap<(String, String), Secret>,
    running_labels: BTreeMap<String, BTreeSet<String>>,
    all_pods_running: bool,
    pod_polls: usize,
    calls: Vec<String>,
}

/// Cluster kept in memory. Every call is recorded as `"<verb> <target>"`.
#[derive(Default)]
pub struct InMemoryCluster {
    state: Mutex<State>,
}

fn name_of(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

impl InMemoryCluster {
    pub fn with_namespace(self, name: &str) -> Self {
        self.state.lock().unwrap().namespaces.insert(name.to_string());
        self
    }

    pub fn with_config_map(self, config_map: ConfigMap) -> Self {
        let namespace = config_map.metadata.namespace.clone().unwrap_or_default();
        let name = name_of(&config_map.metadata);
        self.state
            .lock()
            .unwrap()
            .config_maps
            .insert((namespace, name), config_map);
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        let namespace = secret.metadata.namespace.clone().unwrap_or_default();
        let name = name_of(&secret.metadata);
        self.state
            .lock()
            .unwrap()
            .secrets
            .insert((namespace, name), secret);
        self
    }

    /// Makes `app=<label>` pods report `Running` in the namespace.
    pub fn with_running_pod(self, namespace: &str, label: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .running_labels
            .entry(namespace.to_string())
            .or_default()
            .insert(format!("app={label}"));
        self
    }

    pub fn with_all_pods_running(self) -> Self {
        self.state.lock().unwrap().all_pods_running = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn pod_polls(&self) -> usize {
        self.state.lock().unwrap().pod_polls
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state.lock().unwrap().namespaces.contains(name)
    }

    pub fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.state
            .lock()
            .unwrap()
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn secrets_in(&self, namespace: &str) -> Vec<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, secret)| secret.clone())
            .collect()
    }

    fn record(state: &mut State, call: String) {
        state.calls.push(call);
    }
}

#[async_trait]
impl K8sClient for InMemoryCluster {
    async fn list_namespaces(&self, field_selector: &str) -> kube::Result<Vec<Namespace>> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("list_namespaces {field_selector}"));
        let wanted = field_selector.strip_prefix("metadata.name=");
        Ok(state
            .namespaces
            .iter()
            .filter(|name| wanted.map_or(true, |w| w == name.as_str()))
            .map(|name| Namespace {
                metadata: ObjectMeta {
                    name: Some(name.clone()),
                    ..Default::default()
                },
                ..Default::default()
            })
            .collect())
    }

    async fn create_namespace(&self, namespace: &Namespace) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        let name = name_of(&namespace.metadata);
        Self::record(&mut state, format!("create_namespace {name}"));
        if !state.namespaces.insert(name.clone()) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("namespaces \"{name}\" already exists"),
            ));
        }
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("delete_namespace {name}"));
        if !state.namespaces.remove(name) {
            return Err(api_error(
                404,
                "NotFound",
                format!("namespaces \"{name}\" not found"),
            ));
        }
        Ok(())
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> kube::Result<ConfigMap> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("get_config_map {namespace}/{name}"));
        state
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| {
                api_error(
                    404,
                    "NotFound",
                    format!("configmaps \"{name}\" not found"),
                )
            })
    }

    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        let name = name_of(&config_map.metadata);
        Self::record(&mut state, format!("create_config_map {namespace}/{name}"));
        let key = (namespace.to_string(), name.clone());
        if state.config_maps.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("configmaps \"{name}\" already exists"),
            ));
        }
        state.config_maps.insert(key, config_map.clone());
        Ok(())
    }

    async fn replace_config_map(
        &self,
        namespace: &str,
        name: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("replace_config_map {namespace}/{name}"));
        state
            .config_maps
            .insert((namespace.to_string(), name.to_string()), config_map.clone());
        Ok(())
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("delete_config_map {namespace}/{name}"));
        state
            .config_maps
            .remove(&(namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| {
                api_error(
                    404,
                    "NotFound",
                    format!("configmaps \"{name}\" not found"),
                )
            })
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        let name = name_of(&secret.metadata);
        Self::record(&mut state, format!("create_secret {namespace}/{name}"));
        let key = (namespace.to_string(), name.clone());
        if state.secrets.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("secrets \"{name}\" already exists"),
            ));
        }
        state.secrets.insert(key, secret.clone());
        Ok(())
    }

    async fn replace_secret(
        &self,
        namespace: &str,
        name: &str,
        secret: &Secret,
    ) -> kube::Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("replace_secret {namespace}/{name}"));
        state
            .secrets
            .insert((namespace.to_string(), name.to_string()), secret.clone());
        Ok(())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        field_selector: &str,
        label_selector: &str,
    ) -> kube::Result<Vec<Pod>> {
        let mut state = self.state.lock().unwrap();
        Self::record(
            &mut state,
            format!("list_pods {namespace} {field_selector} {label_selector}"),
        );
        state.pod_polls += 1;
        let running = state.all_pods_running
            || state
                .running_labels
                .get(namespace)
                .map_or(false, |labels| labels.contains(label_selector));
        if running && field_selector == "status.phase=Running" {
            Ok(vec![Pod::default()])
        } else {
            Ok(Vec::new())
        }
    }
}
