use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use logtriage_runtime::{AnalysisInput, Assistant, Message, Role};
use logtriage_types::LogRecord;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::prompts;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// [`Assistant`] backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatAssistant {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ChatAssistant {
    /// Reads `OPENAI_API_KEY` (required), `OPENAI_BASE_URL` and
    /// `LOGTRIAGE_MODEL` (both optional) from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .context("OPENAI_API_KEY is not set")?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        let model = std::env::var("LOGTRIAGE_MODEL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "gpt-4.1".to_string());

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    async fn chat(&self, messages: Vec<Value>) -> anyhow::Result<String> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": 0,
                "messages": messages,
            }))
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("chat completion returned {}: {}", status, body));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .context("decoding chat completion response")?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion had no choices"))
    }
}

#[async_trait]
impl Assistant for ChatAssistant {
    async fn extract_criteria(&self, transcript: &[Message]) -> anyhow::Result<String> {
        let mut messages = vec![json!({"role": "system", "content": prompts::EXTRACT_CRITERIA})];
        for message in transcript {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(json!({"role": role, "content": message.content}));
        }
        self.chat(messages).await
    }

    async fn summarize_log(&self, record: &LogRecord) -> anyhow::Result<String> {
        let messages = vec![
            json!({"role": "system", "content": prompts::SUMMARIZE_LOG}),
            json!({"role": "user", "content": serde_json::to_string_pretty(record)?}),
        ];
        self.chat(messages).await
    }

    async fn analyze(&self, input: &AnalysisInput) -> anyhow::Result<String> {
        let mut content = format!(
            "Selected log record:\n{}\n",
            serde_json::to_string_pretty(&input.record)?
        );
        if let Some(summary) = &input.summary {
            content.push_str(&format!("\nSummary:\n{}\n", summary));
        }
        for (url, code) in &input.code {
            content.push_str(&format!("\nSource file {}:\n```\n{}\n```\n", url, code));
        }

        let messages = vec![
            json!({"role": "system", "content": prompts::ANALYZE}),
            json!({"role": "user", "content": content}),
        ];
        self.chat(messages).await
    }
}
