use chrono::{Duration, FixedOffset, Utc};
use logtriage_types::FilterCriteria;

/// Compose the conjunctive filter query for a set of criteria.
pub fn compose_query(criteria: &FilterCriteria) -> String {
    format!(
        "service:{} AND status:{} AND env:{}",
        criteria.project_name, criteria.log_level, criteria.environment
    )
}

/// Compute the `[now - hours, now]` query window as ISO-8601 timestamps in
/// the given reference timezone.
///
/// The window is anchored to a fixed offset rather than the caller's local
/// clock so query semantics do not drift between hosts.
pub fn time_window(hours: i64, reference_tz: FixedOffset) -> (String, String) {
    let now = Utc::now().with_timezone(&reference_tz);
    let start = now - Duration::hours(hours);
    (start.to_rfc3339(), now.to_rfc3339())
}

/// Build a Logs Explorer deep link for the same query, suitable for pasting
/// into an issue description. The explorer expects millisecond timestamps.
pub fn explorer_url(site: &str, criteria: &FilterCriteria, reference_tz: FixedOffset) -> String {
    let query = format!(
        "service:{} status:{} env:{}",
        criteria.project_name, criteria.log_level, criteria.environment
    );
    let now = Utc::now().with_timezone(&reference_tz);
    let start = now - Duration::hours(criteria.time_period_hours);
    format!(
        "https://app.{}/logs?query={}&from_ts={}&to_ts={}",
        site,
        urlencoding::encode(&query),
        start.timestamp_millis(),
        now.timestamp_millis()
    )
}
