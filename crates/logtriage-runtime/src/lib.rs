pub mod config;
pub mod error;
pub mod gitlab;
pub mod resolver;
pub mod traits;
pub mod workflow;

pub use config::{Config, DatadogConfig, GitlabConfig};
pub use error::{Error, Result};
pub use gitlab::{FetchError, FetchSuccess, GitlabClient, NewIssue};
pub use resolver::{ResolvedCode, Resolver};
pub use traits::{AnalysisInput, Assistant, LogBackend, SourceControl};
pub use workflow::{
    Message, Outcome, Prompt, Role, Stage, Turn, Workflow, WorkflowOptions, WorkflowState,
};
