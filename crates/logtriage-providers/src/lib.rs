pub mod datadog;
pub mod error;

pub use datadog::{DatadogClient, NormalizeOptions, normalize_record};
pub use error::{Error, Result};
