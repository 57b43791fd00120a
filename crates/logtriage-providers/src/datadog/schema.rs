use serde::Deserialize;
use serde_json::Value;

/// Envelope of the v2 logs-search response.
///
/// Individual records stay as raw [`Value`]s: their shape varies per shipper
/// and is flattened by the normalizer, not here.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Meta {
    #[serde(default)]
    pub page: Option<Page>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    #[serde(default)]
    pub after: Option<String>,
}

impl SearchResponse {
    pub(crate) fn next_cursor(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.page.as_ref())
            .and_then(|p| p.after.as_deref())
    }
}
