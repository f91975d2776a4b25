use k8s_openapi::api::core::v1::Secret;
use kube::api::ObjectMeta;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::environment::model::{EnvironmentName, ProjectDescriptor};
use crate::environment::record;
use crate::error::Result;
use crate::kubernetes::model::SharedK8sClient;
use crate::repository::SharedTagResolver;

const BUILD_SECRET_TYPE: &str = "brigade.sh/build";
const PROJECT_HASH_LEN: usize = 54;

/// Stable identifier the build runtime knows a repository by.
pub fn project_id(org: &str, repo: &str) -> String {
    let digest = hex::encode(Sha256::digest(format!("{org}/{repo}").as_bytes()));
    format!("brigade-{}", &digest[..PROJECT_HASH_LEN])
}

/// Lowercase and time-ordered, so build names sort by creation.
pub fn new_build_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// One requested deployment of a project at a resolved commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildTrigger {
    pub build_id: String,
    pub project_id: String,
    pub commit_ref: String,
    pub commit_sha: String,
    pub environment: EnvironmentName,
}

impl BuildTrigger {
    pub fn new(environment: &EnvironmentName, project: &ProjectDescriptor, sha: String) -> Self {
        BuildTrigger {
            build_id: new_build_id(),
            project_id: project_id(&project.org, &project.repo),
            commit_ref: project.tag.clone(),
            commit_sha: sha,
            environment: environment.clone(),
        }
    }

    pub fn build_name(&self) -> String {
        format!("environment-worker-{}", self.build_id)
    }

    pub fn to_secret(&self, namespace: &str) -> Secret {
        let build_name = self.build_name();
        let payload = serde_json::json!({ "name": self.environment.as_str() }).to_string();
        let labels = BTreeMap::from([
            ("build".to_string(), self.build_id.clone()),
            ("component".to_string(), "build".to_string()),
            ("heritage".to_string(), "brigade".to_string()),
            ("project".to_string(), self.project_id.clone()),
        ]);
        let string_data = BTreeMap::from([
            ("build_id".to_string(), build_name.clone()),
            ("build_name".to_string(), build_name.clone()),
            ("commit_id".to_string(), self.commit_sha.clone()),
            ("commit_ref".to_string(), self.commit_ref.clone()),
            ("event_provider".to_string(), "brigade-cli".to_string()),
            ("event_type".to_string(), "exec".to_string()),
            ("log_level".to_string(), "log".to_string()),
            ("payload".to_string(), payload),
            ("project_id".to_string(), self.project_id.clone()),
            ("script".to_string(), String::new()),
        ]);

        Secret {
            metadata: ObjectMeta {
                name: Some(build_name),
                namespace: Some(namespace.to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            type_: Some(BUILD_SECRET_TYPE.to_string()),
            string_data: Some(string_data),
            ..Default::default()
        }
    }
}

/// Reads the environment's projects and asks the build runtime to deploy each one whose
/// tag exists upstream. Every call emits fresh triggers.
pub struct ProjectDeployer {
    client: SharedK8sClient,
    tags: SharedTagResolver,
    control_namespace: String,
}

impl ProjectDeployer {
    pub fn new(
        client: SharedK8sClient,
        tags: SharedTagResolver,
        control_namespace: impl Into<String>,
    ) -> ProjectDeployer {
        ProjectDeployer {
            client,
            tags,
            control_namespace: control_namespace.into(),
        }
    }

    pub async fn deploy_projects(&self, environment: &EnvironmentName) -> Result<Vec<BuildTrigger>> {
        let config_map = self
            .client
            .get_config_map(&self.control_namespace, &record::record_name(environment))
            .await?;
        let projects = record::from_config_map(&config_map)?;

        let mut triggers = Vec::with_capacity(projects.len());
        for (key, project) in &projects {
            let resolved = self.tags.resolve_tag(project).await?;
            let Some(resolved) = resolved else {
                warn!(
                    project = %key,
                    tag = %project.tag,
                    "'{}' tag not found in {}/{} repository",
                    project.tag,
                    project.org,
                    project.repo
                );
                continue;
            };

            info!(
                %environment,
                repo = %project.repo,
                tag = %project.tag,
                sha = %resolved.sha,
                "Triggering deployment"
            );
            let trigger = BuildTrigger::new(environment, project, resolved.sha);
            self.client
                .create_secret(&self.control_namespace, &trigger.to_secret(&self.control_namespace))
                .await?;
            triggers.push(trigger);
        }
        Ok(triggers)
    }
}
