use std::time::Duration;

use async_trait::async_trait;
use logtriage_types::CodeCoordinate;
use tracing::{debug, warn};

use crate::traits::SourceControl;
use crate::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-coordinate fetch failure. None of these abort the workflow: the
/// resolver advances to its next candidate or gives up silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 404 on the requested branch and on the fallback branch.
    NotFound,
    /// 403: the token cannot read this project. Not retried.
    AccessDenied,
    /// Any other non-200 answer, transport failure, or timeout.
    Failed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NotFound => write!(f, "file not found"),
            FetchError::AccessDenied => write!(f, "access denied"),
            FetchError::Failed(msg) => write!(f, "fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// A confirmed raw-content fetch.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    /// The exact URL that answered 200, fallback branch included.
    pub url: String,
    pub content: String,
    /// Branch that actually served the file.
    pub branch: String,
}

/// Fields for a new incident issue.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
}

/// Client for the GitLab REST API: raw-file reads and issue creation.
pub struct GitlabClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    fallback_branch: String,
}

impl GitlabClient {
    pub fn new(base_url: impl Into<String>, token: String, fallback_branch: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            fallback_branch,
        })
    }

    /// Raw-file endpoint URL for a coordinate. Project and path are single
    /// URL segments, so both are fully percent-encoded.
    pub fn raw_url(&self, coordinate: &CodeCoordinate) -> String {
        format!(
            "{}/projects/{}/repository/files/{}/raw?ref={}",
            self.base_url,
            urlencoding::encode(&coordinate.project),
            urlencoding::encode(&coordinate.file_path),
            coordinate.branch
        )
    }

    async fn try_branch(
        &self,
        coordinate: &CodeCoordinate,
        branch: &str,
    ) -> std::result::Result<FetchSuccess, FetchError> {
        let coordinate = CodeCoordinate {
            branch: branch.to_string(),
            ..coordinate.clone()
        };
        let url = self.raw_url(&coordinate);
        debug!(%url, "fetching raw file");

        let response = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "raw fetch failed");
                FetchError::Failed(e.to_string())
            })?;

        match response.status().as_u16() {
            200 => {
                let content = response
                    .text()
                    .await
                    .map_err(|e| FetchError::Failed(e.to_string()))?;
                Ok(FetchSuccess {
                    url,
                    content,
                    branch: branch.to_string(),
                })
            }
            403 => Err(FetchError::AccessDenied),
            404 => Err(FetchError::NotFound),
            code => {
                warn!(%url, code, "unexpected status on raw fetch");
                Err(FetchError::Failed(format!("status {}", code)))
            }
        }
    }
}

#[async_trait]
impl SourceControl for GitlabClient {
    async fn fetch_raw(
        &self,
        coordinate: &CodeCoordinate,
    ) -> std::result::Result<FetchSuccess, FetchError> {
        match self.try_branch(coordinate, &coordinate.branch).await {
            Err(FetchError::NotFound) if coordinate.branch != self.fallback_branch => {
                self.try_branch(coordinate, &self.fallback_branch).await
            }
            other => other,
        }
    }

    async fn create_issue(&self, project: &str, issue: &NewIssue) -> Result<()> {
        let url = format!(
            "{}/projects/{}/issues",
            self.base_url,
            urlencoding::encode(project)
        );
        let response = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .form(&[
                ("title", issue.title.as_str()),
                ("description", issue.description.as_str()),
                ("labels", "bug,automated"),
                ("issue_type", "incident"),
            ])
            .send()
            .await
            .map_err(|e| Error::Issue(e.to_string()))?;

        match response.status().as_u16() {
            201 => Ok(()),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Issue(format!("status {}: {}", code, body)))
            }
        }
    }
}
