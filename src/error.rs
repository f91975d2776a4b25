use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Environment name must be specified")]
    MissingName,

    #[error("Environment name '{0}' is not a DNS label (lowercase alphanumerics and '-', at most 63 characters)")]
    InvalidName(String),

    #[error("Environment '{0}' is protected")]
    ProtectedEnvironment(String),

    #[error("Not a supported action: '{0}'")]
    UnsupportedAction(String),

    #[error("Malformed event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Project '{key}' is missing '{field}' and has no baseline to inherit it from")]
    IncompleteProject { key: String, field: &'static str },

    #[error("{kind} is missing metadata.{field}")]
    MissingMetadata {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Kubernetes API call failed: {0}")]
    Kube(#[from] kube::Error),

    #[error("Environment config '{0}' has no 'environment' entry")]
    MissingEnvironmentData(String),

    #[error("Environment config could not be encoded: {0}")]
    ConfigEncoding(#[from] serde_yaml::Error),

    #[error("Job '{name}' could not be started: {source}")]
    JobSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Job '{name}' failed with {status}. Stderr: {stderr}")]
    JobFailed {
        name: String,
        status: String,
        stderr: String,
    },

    #[error("Repository API request failed: {0}")]
    Repository(#[from] reqwest::Error),

    #[error("Repository API returned {status} for {url}: {body}")]
    UnexpectedRepositoryStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Deployment timed out: no running '{label}' pod in '{namespace}' after {waited:?}")]
    DeploymentTimedOut {
        namespace: String,
        label: String,
        waited: Duration,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
