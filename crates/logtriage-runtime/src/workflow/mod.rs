//! The resumable triage workflow.
//!
//! The machine never performs console I/O. Suspension points surface as
//! [`Turn::Suspended`] values carrying the serialized [`WorkflowState`]; the
//! host (CLI, web frontend, test harness) shows the prompt, collects a
//! reply, and calls [`Workflow::resume`]. That keeps the same machine
//! drivable interactively and programmatically.

mod driver;

use logtriage_types::{FilterCriteria, LogRecord};
use serde::{Deserialize, Serialize};

pub use driver::{Workflow, WorkflowOptions};

use crate::resolver::ResolvedCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Where the session currently is. Stored in the state so a resumed
/// session knows which step to re-enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    ExtractCriteria,
    /// Suspended: criteria could not be parsed, waiting for the operator's
    /// clarification.
    AwaitClarification,
    FilterLogs,
    /// Suspended: waiting for a 1-based pick from the ranked list.
    ReviewSelection,
    ResolveCode,
    FetchCode,
    Analyze,
    /// Suspended: waiting for issue-filing confirmation.
    ConfirmIssue,
    Done,
    DoneEmpty,
    GaveUp,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::DoneEmpty | Stage::GaveUp)
    }
}

/// Mutable session state threaded through every step. Owned by the driver;
/// serializable so non-interactive hosts can persist it across suspensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub stage: Stage,
    pub messages: Vec<Message>,
    pub criteria: Option<FilterCriteria>,
    pub ranked: Vec<LogRecord>,
    pub selected: Option<LogRecord>,
    pub code: Vec<ResolvedCode>,
    pub summary: Option<String>,
    pub analysis: Option<String>,
    pub extract_attempts: u32,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            stage: Stage::ExtractCriteria,
            messages: Vec::new(),
            criteria: None,
            ranked: Vec::new(),
            selected: None,
            code: Vec::new(),
            summary: None,
            analysis: None,
            extract_attempts: 0,
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the host should show the operator while the workflow is suspended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Criteria extraction needs more input; text is the assistant's
    /// clarification question.
    Clarify(String),
    /// Pick a record by its 1-based number from the rendered list.
    SelectRecord(String),
    /// Confirm issue creation (`y` files it).
    ConfirmIssue(String),
}

/// Final result of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No logs matched the criteria.
    Empty,
    /// Analysis was produced; `issue_filed` reports whether an issue was
    /// successfully created.
    Report {
        analysis: String,
        issue_filed: bool,
    },
    /// Criteria extraction exhausted its attempt budget.
    GaveUp,
}

/// One step of driving the workflow: either it paused for input or it
/// reached a terminal stage.
#[derive(Debug)]
pub enum Turn {
    Suspended { state: WorkflowState, prompt: Prompt },
    Finished { state: WorkflowState, outcome: Outcome },
}
