//! Datadog adapter: raw-record schema, tolerant normalization into the
//! canonical [`LogRecord`](logtriage_types::LogRecord) shape, and a paginated
//! query client for the v2 logs-search API.

mod client;
mod normalize;
mod query;
mod schema;

pub use client::{DatadogClient, PAGE_LIMIT};
pub use normalize::{NormalizeOptions, normalize_record};
pub use query::{compose_query, explorer_url, time_window};
