use logtriage_types::LogRecord;

/// Render the ranked records as a numbered selection list.
///
/// Shown at the review suspension point; the operator answers with the
/// 1-based number of the entry to analyze.
pub fn render_selection_list(records: &[LogRecord]) -> String {
    let mut out = String::new();
    for (idx, record) in records.iter().enumerate() {
        let message = record.message.as_deref().unwrap_or("<no message>");
        let filename = record.filename.as_deref().unwrap_or("<unknown file>");
        let service = record.service.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "{}. [{}x] {} ({}, service: {})\n",
            idx + 1,
            record.occurrence_count,
            message,
            filename,
            service
        ));
    }
    out.push_str("Reply with the number of the log to analyze.");
    out
}
