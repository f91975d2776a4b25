use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::jobs::{Job, JobRunner};

pub struct Config {
    pub shell: String,
    pub envs: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shell: "sh".to_string(),
            envs: HashMap::new(),
        }
    }
}

/// Runs jobs on the local machine, each as one `sh -ec` script.
pub struct ShellJobRunner {
    config: Config,
}

impl ShellJobRunner {
    pub fn new(config: Config) -> ShellJobRunner {
        ShellJobRunner { config }
    }
}

#[async_trait]
impl JobRunner for ShellJobRunner {
    async fn run(&self, job: &Job) -> Result<()> {
        info!(job = %job.name, "Starting job");
        let output = async_process::Command::new(&self.config.shell)
            .arg("-ec")
            .arg(job.script())
            .envs(&self.config.envs)
            .output()
            .await
            .map_err(|source| Error::JobSpawn {
                name: job.name.clone(),
                source,
            })?;

        debug!(
            job = %job.name,
            stdout = %String::from_utf8_lossy(&output.stdout),
            "Job output"
        );

        if output.status.success() {
            info!(job = %job.name, "Job finished");
            Ok(())
        } else {
            Err(Error::JobFailed {
                name: job.name.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
