use logtriage_types::LogRecord;
use std::collections::HashMap;

/// Deduplicate and rank normalized records, returning at most `top_n`
/// representatives ordered by descending occurrence count.
///
/// Records without a stack trace or exception info carry no actionable
/// signal and are dropped before counting. Remaining records group on the
/// exact `(message, filename)` pair (`None` groups with `None`); the
/// first-seen record of each group represents it and carries the final
/// count. Ties keep first-seen order.
pub fn rank(records: Vec<LogRecord>, top_n: usize) -> Vec<LogRecord> {
    let mut group_index: HashMap<(Option<String>, Option<String>), usize> = HashMap::new();
    let mut groups: Vec<(LogRecord, u64)> = Vec::new();

    for record in records {
        if !record.has_trace() {
            continue;
        }
        let key = (record.message.clone(), record.filename.clone());
        match group_index.get(&key) {
            Some(&idx) => groups[idx].1 += 1,
            None => {
                group_index.insert(key, groups.len());
                groups.push((record, 1));
            }
        }
    }

    // Stable sort keeps first-seen order within equal counts.
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(top_n);

    groups
        .into_iter()
        .map(|(mut record, count)| {
            record.occurrence_count = count;
            record
        })
        .collect()
}
