//! Inbound lifecycle events and their dispatch.

use serde::Deserialize;
use tracing::{error, info};

use crate::environment::lifecycle::Lifecycle;
use crate::environment::model::{EnvironmentName, ProjectOverrides};
use crate::error::{Error, Result};

/// Body of an `exec` event.
#[derive(Debug, Deserialize)]
pub struct ExecPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub projects: Option<ProjectOverrides>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Provision {
        environment: EnvironmentName,
        projects: ProjectOverrides,
    },
    Refresh {
        environment: EnvironmentName,
        projects: ProjectOverrides,
    },
    Destroy {
        environment: EnvironmentName,
    },
}

impl Command {
    /// Validates the payload; nothing here touches the cluster.
    pub fn from_payload(payload: ExecPayload, control_namespace: &str) -> Result<Command> {
        let environment = EnvironmentName::parse(payload.name.as_deref(), control_namespace)?;
        let projects = payload.projects.unwrap_or_default();

        match payload.action.as_deref() {
            Some("create") => Ok(Command::Provision {
                environment,
                projects,
            }),
            Some("refresh") => Ok(Command::Refresh {
                environment,
                projects,
            }),
            Some("delete") => Ok(Command::Destroy { environment }),
            other => Err(Error::UnsupportedAction(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn parse(raw: &str, control_namespace: &str) -> Result<Command> {
        let payload: ExecPayload = serde_json::from_str(raw)?;
        Command::from_payload(payload, control_namespace)
    }

    pub fn environment(&self) -> &EnvironmentName {
        match self {
            Command::Provision { environment, .. }
            | Command::Refresh { environment, .. }
            | Command::Destroy { environment } => environment,
        }
    }
}

pub async fn dispatch(lifecycle: &Lifecycle, command: &Command) -> Result<()> {
    match command {
        Command::Provision {
            environment,
            projects,
        } => lifecycle.provision(environment, projects).await,
        Command::Refresh {
            environment,
            projects,
        } => lifecycle.refresh(environment, projects).await,
        Command::Destroy { environment } => lifecycle.destroy(environment).await,
    }
}

/// Handles one raw `exec` event. Failures are logged and handed back to the caller.
pub async fn handle_exec(lifecycle: &Lifecycle, raw_payload: &str) -> Result<()> {
    let outcome = match Command::parse(raw_payload, lifecycle.control_namespace()) {
        Ok(command) => {
            info!(environment = %command.environment(), ?command, "Dispatching event");
            dispatch(lifecycle, &command).await
        }
        Err(err) => Err(err),
    };

    if let Err(err) = &outcome {
        log_error(err);
    }
    outcome
}

fn log_error(err: &Error) {
    match err {
        // The apiserver response carries the details worth keeping.
        Error::Kube(kube::Error::Api(response)) => {
            error!(
                code = response.code,
                reason = %response.reason,
                status = %response.status,
                message = %response.message,
                "Kubernetes API error"
            );
        }
        other => error!(error = %other, "Event failed"),
    }
}
