use async_trait::async_trait;
use std::sync::Arc;

pub mod github;
#[cfg(test)]
pub mod stubs;

use crate::environment::model::ProjectDescriptor;
use crate::error::Result;

/// Commit a tag points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTag {
    pub sha: String,
}

#[async_trait]
pub trait TagResolver {
    /// `Ok(None)` when the tag does not exist upstream.
    async fn resolve_tag(&self, project: &ProjectDescriptor) -> Result<Option<ResolvedTag>>;
}

pub type SharedTagResolver = Arc<dyn TagResolver + Send + Sync + 'static>;
