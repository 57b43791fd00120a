use async_trait::async_trait;
use logtriage_types::LogRecord;
use serde_json::Value;

use crate::gitlab::{FetchError, FetchSuccess, NewIssue};
use crate::workflow::Message;
use logtriage_types::CodeCoordinate;

/// The external language model behind the triage workflow.
///
/// The workflow never talks to a model API directly; it goes through this
/// capability so hosts can inject a real client and tests a scripted one.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Ask for filter criteria over the whole transcript. The reply is the
    /// model's raw text: either a JSON object matching
    /// [`FilterCriteria`](logtriage_types::FilterCriteria) or a
    /// clarification question for the operator.
    async fn extract_criteria(&self, transcript: &[Message]) -> anyhow::Result<String>;

    /// Summarize a single selected record for the operator.
    async fn summarize_log(&self, record: &LogRecord) -> anyhow::Result<String>;

    /// Produce the final root-cause analysis from the assembled bundle.
    async fn analyze(&self, input: &AnalysisInput) -> anyhow::Result<String>;
}

/// Everything the analysis step gets to see.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub record: LogRecord,
    pub summary: Option<String>,
    /// `(url, content)` pairs for every confirmed code coordinate.
    pub code: Vec<(String, String)>,
}

/// A queryable log backend. Implemented by
/// [`DatadogClient`](logtriage_providers::DatadogClient); tests use canned
/// pages.
#[async_trait]
pub trait LogBackend: Send + Sync {
    async fn fetch_all(
        &self,
        query: &str,
        from: &str,
        to: &str,
    ) -> logtriage_providers::Result<Vec<Value>>;
}

#[async_trait]
impl LogBackend for logtriage_providers::DatadogClient {
    async fn fetch_all(
        &self,
        query: &str,
        from: &str,
        to: &str,
    ) -> logtriage_providers::Result<Vec<Value>> {
        logtriage_providers::DatadogClient::fetch_all(self, query, from, to).await
    }
}

/// Source-control access: raw-file fetch (doubling as the existence check)
/// and issue creation. Implemented by [`GitlabClient`](crate::GitlabClient).
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Fetch a file's raw content, applying the branch fallback. The `Ok`
    /// value records which URL actually answered.
    async fn fetch_raw(
        &self,
        coordinate: &CodeCoordinate,
    ) -> std::result::Result<FetchSuccess, FetchError>;

    async fn create_issue(&self, project: &str, issue: &NewIssue) -> crate::Result<()>;
}
