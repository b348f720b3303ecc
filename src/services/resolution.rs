//! Job resolution over the append-only record history.
//!
//! Writes only ever append, so store order is chronological and the last
//! record carrying a given `(location, task)` identity is authoritative for
//! that job. Resolution is a pure read-time derivation; it never owns or
//! mutates records.

use std::collections::HashMap;

use crate::models::record::{JobIdentity, JobRecord};
use crate::models::submission::JobSummary;

/// Task text shown in a job label is cut to this many characters.
const LABEL_TASK_CHARS: usize = 30;

/// Distinct ongoing jobs available for update: one summary per
/// `(location, task)` group, carrying the group's last record. Groups are
/// ordered by the position of that last record, so recently touched jobs
/// come later. An empty history yields an empty list.
pub fn list_ongoing_jobs(records: &[JobRecord]) -> Vec<JobSummary> {
    let mut last_index: HashMap<JobIdentity, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        last_index.insert(record.identity(), index);
    }

    let mut indices: Vec<usize> = last_index.into_values().collect();
    indices.sort_unstable();

    indices
        .into_iter()
        .map(|index| {
            let record = &records[index];
            JobSummary {
                identity: record.identity(),
                label: job_label(record),
                latest: record.clone(),
            }
        })
        .collect()
}

/// The latest known state of one job: the last record in store order that
/// matches `identity`. `None` when the job has no history.
pub fn resolve<'a>(records: &'a [JobRecord], identity: &JobIdentity) -> Option<&'a JobRecord> {
    records.iter().rev().find(|r| &r.identity() == identity)
}

fn job_label(record: &JobRecord) -> String {
    let task: String = record.task.chars().take(LABEL_TASK_CHARS).collect();
    format!("{} | {}...", record.location, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Progress, RecordDate, NO_IMAGE};

    fn record(date: &str, location: &str, task: &str, progress: i64) -> JobRecord {
        JobRecord {
            date: RecordDate::parse(date),
            technician: "tech-a".to_string(),
            location: location.to_string(),
            task: task.to_string(),
            team: String::new(),
            image_reference: NO_IMAGE.to_string(),
            progress: Progress::from_percent(progress),
        }
    }

    fn identity(location: &str, task: &str) -> JobIdentity {
        JobIdentity {
            location: location.to_string(),
            task: task.to_string(),
        }
    }

    #[test]
    fn empty_history_lists_no_jobs() {
        assert!(list_ongoing_jobs(&[]).is_empty());
    }

    #[test]
    fn groups_keep_the_last_record() {
        let records = vec![
            record("2024-01-01", "loc1", "taskA", 20),
            record("2024-01-02", "loc2", "taskB", 10),
            record("2024-01-03", "loc1", "taskA", 50),
        ];
        let jobs = list_ongoing_jobs(&records);
        assert_eq!(jobs.len(), 2);

        let job_a = jobs.iter().find(|j| j.identity == identity("loc1", "taskA")).unwrap();
        assert_eq!(job_a.latest.progress.percent(), 50);
    }

    #[test]
    fn groups_order_by_last_occurrence() {
        let records = vec![
            record("2024-01-01", "loc1", "taskA", 20),
            record("2024-01-02", "loc2", "taskB", 10),
            record("2024-01-03", "loc1", "taskA", 50),
        ];
        let jobs = list_ongoing_jobs(&records);
        // loc2 was last touched before loc1's update landed.
        assert_eq!(jobs[0].identity, identity("loc2", "taskB"));
        assert_eq!(jobs[1].identity, identity("loc1", "taskA"));
    }

    #[test]
    fn labels_carry_location_and_truncated_task() {
        let long_task = "x".repeat(80);
        let jobs = list_ongoing_jobs(&[record("2024-01-01", "loc1", &long_task, 0)]);
        assert_eq!(jobs[0].label, format!("loc1 | {}...", "x".repeat(30)));
    }

    #[test]
    fn resolve_returns_last_match_in_store_order() {
        let records = vec![
            record("2024-01-01", "loc1", "taskA", 20),
            record("2024-01-02", "loc1", "taskA", 50),
            record("2024-01-03", "loc2", "taskB", 10),
        ];
        let latest = resolve(&records, &identity("loc1", "taskA")).unwrap();
        assert_eq!(latest.progress.percent(), 50);
        assert_eq!(latest.date, RecordDate::parse("2024-01-02"));
    }

    #[test]
    fn resolve_unknown_identity_is_none() {
        let records = vec![record("2024-01-01", "loc1", "taskA", 20)];
        assert!(resolve(&records, &identity("loc9", "taskZ")).is_none());
    }

    #[test]
    fn identical_records_resolve_to_the_later_index() {
        // Two byte-identical rows: the second one is authoritative.
        let records = vec![
            record("2024-01-01", "loc1", "taskA", 20),
            record("2024-01-01", "loc1", "taskA", 20),
        ];
        let latest = resolve(&records, &identity("loc1", "taskA")).unwrap();
        assert!(std::ptr::eq(latest, &records[1]));
    }
}
