use std::sync::Mutex;

use async_trait::async_trait;
use logtriage_runtime::LogBackend;
use serde_json::Value;

/// A [`LogBackend`] serving a fixed set of raw records, recording the
/// queries it was asked.
pub struct CannedBackend {
    records: Vec<Value>,
    queries: Mutex<Vec<String>>,
}

impl CannedBackend {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Queries issued so far, in order.
    pub fn seen_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogBackend for CannedBackend {
    async fn fetch_all(
        &self,
        query: &str,
        _from: &str,
        _to: &str,
    ) -> logtriage_providers::Result<Vec<Value>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.records.clone())
    }
}
