use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use logtriage_runtime::{AnalysisInput, Assistant, Message};
use logtriage_types::LogRecord;

/// An [`Assistant`] that replays canned replies.
///
/// Criteria-extraction replies are consumed in order; once the queue is
/// empty the last reply repeats. Summary and analysis are fixed strings.
pub struct ScriptedAssistant {
    extract_replies: Mutex<VecDeque<String>>,
    last_reply: Mutex<String>,
    summary: String,
    analysis: String,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self {
            extract_replies: Mutex::new(VecDeque::new()),
            last_reply: Mutex::new("Which project, level, period and environment?".to_string()),
            summary: "canned summary".to_string(),
            analysis: "canned analysis".to_string(),
        }
    }

    /// Queue one criteria-extraction reply.
    pub fn with_extract_reply(self, reply: impl Into<String>) -> Self {
        self.extract_replies.lock().unwrap().push_back(reply.into());
        self
    }

    /// Shortcut: queue a well-formed criteria JSON reply.
    pub fn with_criteria(self, project: &str, level: &str, hours: i64, env: &str) -> Self {
        self.with_extract_reply(format!(
            r#"{{"project_name":"{}","log_level":"{}","time_period_hours":{},"environment":"{}"}}"#,
            project, level, hours, env
        ))
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = analysis.into();
        self
    }
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Assistant for ScriptedAssistant {
    async fn extract_criteria(&self, _transcript: &[Message]) -> anyhow::Result<String> {
        let mut queue = self.extract_replies.lock().unwrap();
        match queue.pop_front() {
            Some(reply) => {
                *self.last_reply.lock().unwrap() = reply.clone();
                Ok(reply)
            }
            None => Ok(self.last_reply.lock().unwrap().clone()),
        }
    }

    async fn summarize_log(&self, _record: &LogRecord) -> anyhow::Result<String> {
        Ok(self.summary.clone())
    }

    async fn analyze(&self, _input: &AnalysisInput) -> anyhow::Result<String> {
        Ok(self.analysis.clone())
    }
}
