use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::environment::model::ProjectDescriptor;
use crate::error::{Error, Result};
use crate::repository::{ResolvedTag, TagResolver};

pub const DEFAULT_API_URL: &str = "https://api.github.com/repos";

#[derive(Clone)]
pub struct RepositoryCredentials {
    pub token: String,
}

impl std::fmt::Debug for RepositoryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

pub struct GithubTagResolver {
    http: reqwest::Client,
    api_url: String,
    credentials: RepositoryCredentials,
}

impl GithubTagResolver {
    pub fn new(api_url: impl Into<String>, credentials: RepositoryCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("preview-env/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GithubTagResolver {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn tag_url(&self, project: &ProjectDescriptor) -> String {
        format!(
            "{}/{}/{}/git/refs/tags/{}",
            self.api_url, project.org, project.repo, project.tag
        )
    }
}

#[async_trait]
impl TagResolver for GithubTagResolver {
    async fn resolve_tag(&self, project: &ProjectDescriptor) -> Result<Option<ResolvedTag>> {
        let url = self.tag_url(project);
        debug!(%url, "Resolving tag");
        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        if !self.credentials.token.is_empty() {
            request = request.bearer_auth(&self.credentials.token);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let git_ref: GitRef = response.json().await?;
                Ok(Some(ResolvedTag {
                    sha: git_ref.object.sha,
                }))
            }
            status => Err(Error::UnexpectedRepositoryStatus {
                url,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
