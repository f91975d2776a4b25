use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::jobs::{Job, JobRunner};

/// Records jobs instead of running them.
#[derive(Default)]
pub struct RecordingRunner {
    fail_on: Option<String>,
    jobs: Mutex<Vec<Job>>,
}

impl RecordingRunner {
    pub fn failing_on(name: &str) -> RecordingRunner {
        RecordingRunner {
            fail_on: Some(name.to_string()),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn job_names(&self) -> Vec<String> {
        self.jobs().into_iter().map(|job| job.name).collect()
    }
}

#[async_trait]
impl JobRunner for RecordingRunner {
    async fn run(&self, job: &Job) -> Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        if self.fail_on.as_deref() == Some(job.name.as_str()) {
            return Err(Error::JobFailed {
                name: job.name.clone(),
                status: "exit status: 1".to_string(),
                stderr: "Error: release failed".to_string(),
            });
        }
        Ok(())
    }
}
