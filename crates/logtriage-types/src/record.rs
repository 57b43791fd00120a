use serde::{Deserialize, Serialize};

/// One log event in canonical shape, produced by a backend normalizer.
///
/// Records are immutable after normalization with two exceptions owned by
/// later pipeline stages: `occurrence_count` is attached by the ranking
/// engine (zero and meaningless before that), and `code_urls` is filled in
/// by the code-location resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub document_id: Option<String>,
    pub message: Option<String>,
    pub service: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
    /// Condensed stack trace (newline-joined), or `None` when the raw trace
    /// had no usable structure.
    pub stack_trace: Option<String>,
    /// Raw exception info, kept verbatim as the fallback signal.
    pub exc_info: Option<String>,
    pub filename: Option<String>,
    /// Branch name derived from an `image_tag:<branch>-<hash>` tag.
    pub branch: Option<String>,
    pub appname: Option<String>,
    #[serde(default)]
    pub occurrence_count: u64,
    #[serde(default)]
    pub code_urls: Vec<String>,
}

impl LogRecord {
    /// Whether the record carries an actionable error signal.
    ///
    /// Records with neither a stack trace nor exception info are dropped by
    /// the ranking engine: there is nothing to locate code for.
    pub fn has_trace(&self) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.is_empty());
        non_empty(&self.stack_trace) || non_empty(&self.exc_info)
    }

    /// Trace lines for the resolver: the condensed stack trace when present,
    /// else the raw exception info.
    pub fn trace_lines(&self) -> Vec<&str> {
        self.stack_trace
            .as_deref()
            .or(self.exc_info.as_deref())
            .map(|t| t.lines().collect())
            .unwrap_or_default()
    }
}
