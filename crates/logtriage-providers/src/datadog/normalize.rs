use logtriage_types::LogRecord;
use serde_json::Value;
use tracing::warn;

/// Maximum number of condensed stack-trace lines kept per record.
const MAX_TRACE_LINES: usize = 5;

/// Knobs for the normalizer.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Application package marker a trace line must contain to survive
    /// condensing, e.g. `de.carsync.`.
    pub package_marker: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            package_marker: "de.carsync.".to_string(),
        }
    }
}

/// Convert one raw backend record into the canonical [`LogRecord`] shape.
///
/// Shippers disagree on nesting: fields may sit at the top level, under
/// `attributes`, or one level deeper under `attributes.attributes`. Lookup
/// checks all three, deepest first. Malformed records never fail; fields the
/// record does not carry in a usable shape come back as `None`.
pub fn normalize_record(raw: &Value, options: &NormalizeOptions) -> LogRecord {
    let stack_trace = lookup_str(raw, "stack_trace");
    let exc_info = lookup_str(raw, "exc_info");

    LogRecord {
        document_id: lookup_str(raw, "id").or_else(|| lookup_str(raw, "document_id")),
        message: lookup_str(raw, "message"),
        service: lookup_str(raw, "service"),
        status: lookup_str(raw, "status"),
        timestamp: lookup_str(raw, "timestamp"),
        stack_trace: condense_stack_trace(
            stack_trace.as_deref(),
            exc_info.as_deref(),
            &options.package_marker,
        ),
        exc_info,
        filename: lookup_str(raw, "filename").or_else(|| lookup_str(raw, "logger_name")),
        branch: branch_from_tags(&lookup_tags(raw)),
        appname: lookup_str(raw, "application-name"),
        occurrence_count: 0,
        code_urls: Vec::new(),
    }
}

/// Condense a raw stack trace down to the application-relevant frames.
///
/// Keeps the first line unconditionally, plus lines containing both the
/// package marker and a file/line marker, capped at [`MAX_TRACE_LINES`].
/// Fewer than two surviving lines means the trace had no usable structure:
/// fall back to `exc_info` verbatim, else `None`.
fn condense_stack_trace(
    stack_trace: Option<&str>,
    exc_info: Option<&str>,
    package_marker: &str,
) -> Option<String> {
    let fallback = || exc_info.filter(|s| !s.is_empty()).map(str::to_string);

    let Some(raw) = stack_trace.filter(|s| !s.is_empty()) else {
        return fallback();
    };

    let kept: Vec<&str> = raw
        .lines()
        .enumerate()
        .filter(|(idx, line)| {
            *idx == 0
                || (line.contains(package_marker)
                    && (line.contains(".java:") || line.contains(".py:")))
        })
        .map(|(_, line)| line.trim())
        .take(MAX_TRACE_LINES)
        .collect();

    if kept.len() < 2 {
        warn!(
            marker = package_marker,
            "stack trace has no application frames, falling back to exc_info"
        );
        return fallback();
    }

    Some(kept.join("\n"))
}

/// Pull the branch name out of a tag list.
///
/// Image tags look like `image_tag:master-df7809ab`: the part after the
/// prefix and before the first `-` is the branch. Extraction is idempotent;
/// a bare branch name maps to itself.
fn branch_from_tags(tags: &[String]) -> Option<String> {
    tags.iter()
        .find_map(|tag| tag.strip_prefix("image_tag:"))
        .map(branch_from_tag_value)
}

pub(crate) fn branch_from_tag_value(value: &str) -> String {
    value.split_once('-').map_or(value, |(branch, _)| branch).to_string()
}

fn lookup_tags(raw: &Value) -> Vec<String> {
    for layer in layers(raw) {
        if let Some(tags) = layer.get("tags").and_then(Value::as_array) {
            return tags
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
    }
    Vec::new()
}

fn lookup_str(raw: &Value, key: &str) -> Option<String> {
    for layer in layers(raw) {
        if let Some(value) = layer.get(key).and_then(Value::as_str) {
            return Some(value.to_string());
        }
    }
    None
}

/// Lookup layers, deepest (most specific) first.
fn layers(raw: &Value) -> impl Iterator<Item = &Value> {
    let attributes = raw.get("attributes");
    let nested = attributes.and_then(|a| a.get("attributes"));
    [nested, attributes, Some(raw)].into_iter().flatten()
}
