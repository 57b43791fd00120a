//! Testing infrastructure for logtriage integration tests.
//!
//! Provides deterministic stand-ins for the external collaborators:
//! - [`ScriptedAssistant`]: canned language-model replies
//! - [`CannedBackend`]: a log backend serving fixed records
//! - [`fixtures`]: raw Datadog-shaped record builders

pub mod assistant;
pub mod backend;
pub mod fixtures;

pub use assistant::ScriptedAssistant;
pub use backend::CannedBackend;
