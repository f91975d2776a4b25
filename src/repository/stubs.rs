use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::environment::model::ProjectDescriptor;
use crate::error::Result;
use crate::repository::{ResolvedTag, TagResolver};

/// Answers from a fixed `org/repo@tag -> sha` table; anything else is a missing tag.
#[derive(Default)]
pub struct FixedTags {
    tags: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

fn key(org: &str, repo: &str, tag: &str) -> String {
    format!("{org}/{repo}@{tag}")
}

impl FixedTags {
    pub fn with_tag(mut self, org: &str, repo: &str, tag: &str, sha: &str) -> Self {
        self.tags.insert(key(org, repo, tag), sha.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl TagResolver for FixedTags {
    async fn resolve_tag(&self, project: &ProjectDescriptor) -> Result<Option<ResolvedTag>> {
        let key = key(&project.org, &project.repo, &project.tag);
        self.lookups.lock().unwrap().push(key.clone());
        Ok(self
            .tags
            .get(&key)
            .map(|sha| ResolvedTag { sha: sha.clone() }))
    }
}
