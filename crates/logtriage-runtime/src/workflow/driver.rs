use std::sync::Arc;

use chrono::FixedOffset;
use logtriage_providers::datadog::{compose_query, explorer_url, time_window};
use logtriage_providers::{NormalizeOptions, normalize_record};
use logtriage_types::{FilterCriteria, LogRecord};
use tracing::warn;

use crate::gitlab::NewIssue;
use crate::resolver::Resolver;
use crate::traits::{AnalysisInput, Assistant, LogBackend, SourceControl};
use crate::workflow::{Message, Outcome, Prompt, Stage, Turn, WorkflowState};
use crate::{Config, Error, Result};

/// Driver knobs, usually derived from [`Config`].
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub top_n: usize,
    pub max_extract_attempts: u32,
    pub reference_tz: FixedOffset,
    pub package_marker: String,
    pub fallback_branch: String,
    /// Datadog site for deep links in issue descriptions.
    pub site: String,
}

impl WorkflowOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_n: config.top_n,
            max_extract_attempts: config.max_extract_attempts,
            reference_tz: config.reference_tz,
            package_marker: config.package_marker.clone(),
            fallback_branch: config.fallback_branch.clone(),
            site: config.datadog.site.clone(),
        }
    }
}

/// The triage workflow driver.
///
/// Holds only capabilities and options; all session data lives in the
/// [`WorkflowState`] passed through [`Workflow::start`] and
/// [`Workflow::resume`], so one driver can serve many sessions.
pub struct Workflow {
    backend: Arc<dyn LogBackend>,
    assistant: Arc<dyn Assistant>,
    source: Option<Arc<dyn SourceControl>>,
    options: WorkflowOptions,
}

impl Workflow {
    pub fn new(
        backend: Arc<dyn LogBackend>,
        assistant: Arc<dyn Assistant>,
        source: Option<Arc<dyn SourceControl>>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            backend,
            assistant,
            source,
            options,
        }
    }

    /// Begin a session from the operator's initial request.
    pub async fn start(&self, request: &str) -> Result<Turn> {
        let mut state = WorkflowState::new();
        state.messages.push(Message::user(request));
        self.advance(state).await
    }

    /// Resume a suspended session with the operator's reply.
    pub async fn resume(&self, mut state: WorkflowState, input: &str) -> Result<Turn> {
        match state.stage {
            Stage::AwaitClarification => {
                state.messages.push(Message::user(input));
                state.stage = Stage::ExtractCriteria;
                self.advance(state).await
            }
            Stage::ReviewSelection => match parse_selection(input, state.ranked.len()) {
                Ok(idx) => {
                    state.messages.push(Message::user(input));
                    state.selected = Some(state.ranked[idx].clone());
                    state.stage = Stage::ResolveCode;
                    self.advance(state).await
                }
                // Invalid selection re-suspends at the same stage; the
                // transcript is left untouched.
                Err(reason) => {
                    let listing = logtriage_engine::render_selection_list(&state.ranked);
                    Ok(Turn::Suspended {
                        prompt: Prompt::SelectRecord(format!("{}\n{}", reason, listing)),
                        state,
                    })
                }
            },
            Stage::ConfirmIssue => self.finish_with_issue(state, input).await,
            stage => Err(Error::InvalidOperation(format!(
                "cannot resume from stage {:?}",
                stage
            ))),
        }
    }

    async fn advance(&self, mut state: WorkflowState) -> Result<Turn> {
        loop {
            match state.stage {
                Stage::ExtractCriteria => {
                    if let Some(turn) = self.extract_criteria(&mut state).await? {
                        return Ok(turn);
                    }
                }
                Stage::FilterLogs => {
                    if let Some(turn) = self.filter_logs(&mut state).await? {
                        return Ok(turn);
                    }
                }
                Stage::ResolveCode => self.resolve_code(&mut state).await,
                Stage::FetchCode => {
                    // Bodies arrive with resolution (the existence check is
                    // a raw fetch); nothing left to do for mined paths.
                    state.stage = Stage::Analyze;
                }
                Stage::Analyze => return self.analyze(state).await,
                stage => {
                    return Err(Error::InvalidOperation(format!(
                        "cannot advance from stage {:?}",
                        stage
                    )));
                }
            }
        }
    }

    /// Returns `Some(turn)` when the step suspended or finished, `None` to
    /// keep advancing.
    async fn extract_criteria(&self, state: &mut WorkflowState) -> Result<Option<Turn>> {
        state.extract_attempts += 1;
        let reply = self
            .assistant
            .extract_criteria(&state.messages)
            .await
            .map_err(|e| Error::Assistant(e.to_string()))?;
        state.messages.push(Message::assistant(reply.clone()));

        match parse_criteria(&reply) {
            Ok(criteria) => {
                state.criteria = Some(criteria);
                state.stage = Stage::FilterLogs;
                Ok(None)
            }
            Err(_) if state.extract_attempts >= self.options.max_extract_attempts => {
                state.stage = Stage::GaveUp;
                Ok(Some(Turn::Finished {
                    state: state.clone(),
                    outcome: Outcome::GaveUp,
                }))
            }
            Err(_) => {
                state.stage = Stage::AwaitClarification;
                let question = reply;
                Ok(Some(Turn::Suspended {
                    state: state.clone(),
                    prompt: Prompt::Clarify(question),
                }))
            }
        }
    }

    async fn filter_logs(&self, state: &mut WorkflowState) -> Result<Option<Turn>> {
        let criteria = state
            .criteria
            .clone()
            .ok_or_else(|| Error::InvalidOperation("filtering without criteria".to_string()))?;

        let query = compose_query(&criteria);
        let (from, to) = time_window(criteria.time_period_hours, self.options.reference_tz);
        let raw = self.backend.fetch_all(&query, &from, &to).await?;

        let normalize_options = NormalizeOptions {
            package_marker: self.options.package_marker.clone(),
        };
        let records: Vec<LogRecord> = raw
            .iter()
            .map(|r| normalize_record(r, &normalize_options))
            .collect();
        let ranked = logtriage_engine::rank(records, self.options.top_n);

        match ranked.len() {
            0 => {
                state.stage = Stage::DoneEmpty;
                Ok(Some(Turn::Finished {
                    state: state.clone(),
                    outcome: Outcome::Empty,
                }))
            }
            1 => {
                state.selected = Some(ranked[0].clone());
                state.ranked = ranked;
                state.stage = Stage::ResolveCode;
                Ok(None)
            }
            _ => {
                state.ranked = ranked;
                state.stage = Stage::ReviewSelection;
                let listing = logtriage_engine::render_selection_list(&state.ranked);
                state.messages.push(Message::assistant(listing.clone()));
                Ok(Some(Turn::Suspended {
                    state: state.clone(),
                    prompt: Prompt::SelectRecord(listing),
                }))
            }
        }
    }

    /// Summarizing the selected log and locating its code have no ordering
    /// dependency; they run concurrently and write disjoint state fields.
    async fn resolve_code(&self, state: &mut WorkflowState) {
        let Some(selected) = state.selected.clone() else {
            state.stage = Stage::FetchCode;
            return;
        };

        let summarize = self.assistant.summarize_log(&selected);
        let locate = async {
            match &self.source {
                Some(source) => {
                    Resolver::new(source.as_ref(), self.options.fallback_branch.clone())
                        .resolve(&selected, None)
                        .await
                }
                None => Vec::new(),
            }
        };
        let (summary, code) = tokio::join!(summarize, locate);

        state.summary = match summary {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(error = %err, "log summarization failed, continuing without");
                None
            }
        };
        state.code = code;
        if let Some(selected) = state.selected.as_mut() {
            selected.code_urls = state.code.iter().map(|c| c.url.clone()).collect();
        }
        state.stage = Stage::FetchCode;
    }

    async fn analyze(&self, mut state: WorkflowState) -> Result<Turn> {
        let record = state
            .selected
            .clone()
            .ok_or_else(|| Error::InvalidOperation("analyzing without a selection".to_string()))?;
        let input = AnalysisInput {
            record,
            summary: state.summary.clone(),
            code: state
                .code
                .iter()
                .map(|c| (c.url.clone(), c.content.clone()))
                .collect(),
        };
        let analysis = self
            .assistant
            .analyze(&input)
            .await
            .map_err(|e| Error::Assistant(e.to_string()))?;
        state.messages.push(Message::assistant(analysis.clone()));
        state.analysis = Some(analysis.clone());

        if self.source.is_some() && !state.code.is_empty() {
            state.stage = Stage::ConfirmIssue;
            let title = issue_title(&analysis);
            Ok(Turn::Suspended {
                state,
                prompt: Prompt::ConfirmIssue(format!(
                    "Create a GitLab issue for this analysis? (Title: {}) [y/N]",
                    title
                )),
            })
        } else {
            state.stage = Stage::Done;
            Ok(Turn::Finished {
                state,
                outcome: Outcome::Report {
                    analysis,
                    issue_filed: false,
                },
            })
        }
    }

    async fn finish_with_issue(&self, mut state: WorkflowState, input: &str) -> Result<Turn> {
        let analysis = state
            .analysis
            .clone()
            .ok_or_else(|| Error::InvalidOperation("no analysis to file".to_string()))?;

        let mut issue_filed = false;
        if input.trim().eq_ignore_ascii_case("y") {
            if let (Some(source), Some(first)) = (&self.source, state.code.first()) {
                let deep_link = state
                    .criteria
                    .as_ref()
                    .map(|c| explorer_url(&self.options.site, c, self.options.reference_tz));
                let description = match deep_link {
                    Some(link) => {
                        format!("{}\n\n----\n#### Datadog logs:\n{}", analysis, link)
                    }
                    None => analysis.clone(),
                };
                let issue = NewIssue {
                    title: issue_title(&analysis),
                    description,
                };
                match source.create_issue(&first.coordinate.project, &issue).await {
                    Ok(()) => issue_filed = true,
                    Err(err) => warn!(error = %err, "issue creation failed"),
                }
            }
        }

        state.stage = Stage::Done;
        Ok(Turn::Finished {
            state,
            outcome: Outcome::Report {
                analysis,
                issue_filed,
            },
        })
    }
}

/// Parse the assistant's reply into validated criteria.
///
/// The reply may wrap the JSON object in prose or markdown fences; only the
/// outermost `{...}` span is considered.
fn parse_criteria(reply: &str) -> std::result::Result<FilterCriteria, String> {
    let start = reply.find('{').ok_or("no JSON object in reply")?;
    let end = reply.rfind('}').ok_or("no JSON object in reply")?;
    if end < start {
        return Err("no JSON object in reply".to_string());
    }
    let criteria: FilterCriteria =
        serde_json::from_str(&reply[start..=end]).map_err(|e| e.to_string())?;
    criteria.validated()
}

/// Parse a 1-based selection against a list of `len` entries.
fn parse_selection(input: &str, len: usize) -> std::result::Result<usize, String> {
    let number: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("{:?} is not a number.", input.trim()))?;
    if number == 0 || number > len {
        return Err(format!(
            "{} is out of range, pick a number between 1 and {}.",
            number, len
        ));
    }
    Ok(number - 1)
}

/// Derive an issue title from the analysis text: the first `Title:` line if
/// the assistant produced one, else a generic fallback.
fn issue_title(analysis: &str) -> String {
    let derived = analysis
        .lines()
        .find_map(|line| line.trim().strip_prefix("Title:"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Log analysis");
    format!("[auto-triage] {}", derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_criteria_accepts_fenced_json() {
        let reply = "```json\n{\"project_name\":\"document\",\"log_level\":\"error\",\"time_period_hours\":24,\"environment\":\"live\"}\n```";
        let criteria = parse_criteria(reply).unwrap();
        assert_eq!(criteria.project_name, "document");
        assert_eq!(criteria.environment, "prod");
    }

    #[test]
    fn test_parse_criteria_rejects_questions() {
        assert!(parse_criteria("Which environment do you mean?").is_err());
    }

    #[test]
    fn test_parse_criteria_rejects_invalid_window() {
        let reply = r#"{"project_name":"d","log_level":"error","time_period_hours":0,"environment":"prod"}"#;
        assert!(parse_criteria(reply).is_err());

        // Absurd windows go back through the clarify loop instead of
        // reaching the time arithmetic.
        let reply = r#"{"project_name":"d","log_level":"error","time_period_hours":4000000000000,"environment":"prod"}"#;
        assert!(parse_criteria(reply).is_err());
    }

    #[test]
    fn test_parse_selection_bounds() {
        assert_eq!(parse_selection("2", 3), Ok(1));
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("99", 3).is_err());
        assert!(parse_selection("two", 3).is_err());
        assert_eq!(parse_selection(" 1 ", 3), Ok(0));
    }

    #[test]
    fn test_issue_title_derivation() {
        let analysis = "Summary first\nTitle: NPE in VehicleEventListener\nDetails...";
        assert_eq!(
            issue_title(analysis),
            "[auto-triage] NPE in VehicleEventListener"
        );
        assert_eq!(issue_title("no title line"), "[auto-triage] Log analysis");
    }
}
