use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::datadog::schema::SearchResponse;
use crate::error::{Error, Result};

/// Records requested per page. Large on purpose to minimize round trips.
pub const PAGE_LIMIT: usize = 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Client for the Datadog v2 logs-search API.
///
/// Pagination is transparent: [`DatadogClient::fetch_all`] follows the
/// backend cursor until exhaustion and returns every matching raw record.
/// There is no retry policy here; callers decide what to do with a
/// transient [`Error`].
pub struct DatadogClient {
    http: reqwest::Client,
    search_url: String,
    api_key: String,
    app_key: String,
    timezone: String,
}

impl DatadogClient {
    /// Client against a Datadog site, e.g. `datadoghq.eu`.
    pub fn for_site(site: &str, api_key: String, app_key: String, timezone: String) -> Result<Self> {
        Self::new(format!("https://api.{}", site), api_key, app_key, timezone)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: String,
        app_key: String,
        timezone: String,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            search_url: format!(
                "{}/api/v2/logs/events/search",
                base_url.into().trim_end_matches('/')
            ),
            api_key,
            app_key,
            timezone,
        })
    }

    /// Fetch every record matching `query` within `[from, to]`.
    ///
    /// Issues repeated search requests, following the `meta.page.after`
    /// cursor until the backend stops returning one. A backend that repeats
    /// a cursor would loop forever; that protocol violation surfaces as
    /// [`Error::Cursor`].
    pub async fn fetch_all(&self, query: &str, from: &str, to: &str) -> Result<Vec<Value>> {
        let mut all_records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut page = json!({ "limit": PAGE_LIMIT });
            if let Some(ref c) = cursor {
                page["cursor"] = json!(c);
            }
            let body = json!({
                "filter": { "query": query, "from": from, "to": to },
                "options": { "timezone": self.timezone },
                "sort": "timestamp",
                "page": page,
            });

            let response = self
                .http
                .post(&self.search_url)
                .header("DD-API-KEY", &self.api_key)
                .header("DD-APPLICATION-KEY", &self.app_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Status {
                    code: status.as_u16(),
                    body,
                });
            }

            let page: SearchResponse = serde_json::from_str(&response.text().await?)?;
            debug!(records = page.data.len(), "fetched log page");
            let next_cursor = page.next_cursor().map(str::to_string);
            all_records.extend(page.data);

            match next_cursor {
                Some(next) => {
                    if cursor.as_deref() == Some(next.as_str()) {
                        return Err(Error::Cursor(next));
                    }
                    cursor = Some(next);
                }
                None => break,
            }
        }

        Ok(all_records)
    }
}
