use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Names that never become preview environments, in addition to the control namespace.
pub const PROTECTED_NAMES: [&str; 5] = ["default", "kube-public", "kube-system", "prod", "stage"];

/// Longest name a namespace may carry.
const MAX_NAME_LEN: usize = 63;

/// A validated environment name. Doubles as the environment's namespace and is
/// interpolated into job scripts, so it is always an RFC 1123 label.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    pub fn parse(name: Option<&str>, control_namespace: &str) -> Result<EnvironmentName> {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingName)?;

        if !is_dns_label(name) {
            return Err(Error::InvalidName(name.to_string()));
        }
        if name == control_namespace || PROTECTED_NAMES.contains(&name) {
            return Err(Error::ProtectedEnvironment(name.to_string()));
        }
        Ok(EnvironmentName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_dns_label(name: &str) -> bool {
    let bytes = name.as_bytes();
    let alphanumeric = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_NAME_LEN
                && alphanumeric(first)
                && alphanumeric(last)
                && bytes.iter().all(|b| alphanumeric(b) || *b == b'-')
        }
        _ => false,
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub org: String,
    pub repo: String,
    pub tag: String,
}

/// Per-key change requested by an event; absent fields keep their current value.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Project key to descriptor, in insertion order.
pub type ProjectsConfig = IndexMap<String, ProjectDescriptor>;

pub type ProjectOverrides = IndexMap<String, ProjectOverride>;

impl ProjectOverride {
    fn apply_to(&self, descriptor: &mut ProjectDescriptor) {
        if let Some(org) = &self.org {
            descriptor.org = org.clone();
        }
        if let Some(repo) = &self.repo {
            descriptor.repo = repo.clone();
        }
        if let Some(tag) = &self.tag {
            descriptor.tag = tag.clone();
        }
    }

    fn into_descriptor(self, key: &str) -> Result<ProjectDescriptor> {
        let missing = |field| Error::IncompleteProject {
            key: key.to_string(),
            field,
        };
        Ok(ProjectDescriptor {
            org: self.org.ok_or_else(|| missing("org"))?,
            repo: self.repo.ok_or_else(|| missing("repo"))?,
            tag: self.tag.ok_or_else(|| missing("tag"))?,
        })
    }
}

/// Lays `overrides` over `base`. Keys only in `base` are kept as they are; keys only in
/// `overrides` are appended and must name org, repo and tag.
pub fn overlay(base: &ProjectsConfig, overrides: &ProjectOverrides) -> Result<ProjectsConfig> {
    let mut merged = base.clone();
    for (key, project_override) in overrides {
        match merged.get_mut(key) {
            Some(descriptor) => project_override.apply_to(descriptor),
            None => {
                let descriptor = project_override.clone().into_descriptor(key)?;
                merged.insert(key.clone(), descriptor);
            }
        }
    }
    Ok(merged)
}
