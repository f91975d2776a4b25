use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::error::Result;

pub mod script;
#[cfg(test)]
pub mod stubs;

/// A named unit of shell work, executed as a single script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub tasks: Vec<String>,
}

impl Job {
    pub fn new(name: impl Into<String>, tasks: Vec<String>) -> Job {
        Job {
            name: name.into(),
            tasks,
        }
    }

    pub fn script(&self) -> String {
        self.tasks.join("\n")
    }
}

#[async_trait]
pub trait JobRunner {
    async fn run(&self, job: &Job) -> Result<()>;
}

pub type SharedJobRunner = Arc<dyn JobRunner + Send + Sync + 'static>;

/// Starts every job at once and waits for all of them. The first failure wins.
pub async fn run_all(runner: &SharedJobRunner, jobs: &[Job]) -> Result<()> {
    try_join_all(jobs.iter().map(|job| runner.run(job))).await?;
    Ok(())
}
