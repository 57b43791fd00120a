//! Raw Datadog-shaped record builders.
//!
//! Records come back the way the logs-search API ships them: interesting
//! fields nested under `attributes`, custom fields one level deeper.

use serde_json::{Value, json};

/// A Java error record with a condensable stack trace.
pub fn java_error_record(message: &str, filename: &str, appname: &str) -> Value {
    let trace = format!(
        "java.lang.RuntimeException: {}\n\
         \tat de.carsync.fleet.core.listener.{}.onEvent({}:42)\n\
         \tat org.springframework.Dispatcher.dispatch(Dispatcher.java:100)",
        message,
        filename.trim_end_matches(".java"),
        filename
    );
    json!({
        "id": format!("rec-{}-{}", message, filename),
        "attributes": {
            "message": message,
            "service": appname,
            "status": "error",
            "timestamp": "2024-06-01T12:00:00Z",
            "tags": ["env:prod", "image_tag:master-df7809ab"],
            "attributes": {
                "filename": filename,
                "stack_trace": trace,
                "application-name": appname,
            }
        }
    })
}

/// A record with no stack trace or exception info: never eligible for
/// ranking.
pub fn traceless_record(message: &str) -> Value {
    json!({
        "id": format!("rec-{}", message),
        "attributes": {
            "message": message,
            "status": "error",
            "attributes": { "filename": "noise.java" }
        }
    })
}

/// A Python record whose only signal is `exc_info`.
pub fn python_error_record(message: &str, exc_info: &str, appname: &str) -> Value {
    json!({
        "attributes": {
            "message": message,
            "service": appname,
            "status": "error",
            "tags": ["image_tag:develop"],
            "attributes": {
                "logger_name": "app.worker",
                "exc_info": exc_info,
                "application-name": appname,
            }
        }
    })
}

/// `count` copies of the same Java error record.
pub fn repeated(count: usize, record: Value) -> Vec<Value> {
    vec![record; count]
}
