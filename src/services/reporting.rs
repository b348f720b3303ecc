//! Read-only reporting over a single `read_all` snapshot.
//!
//! Records whose date did not parse are excluded from the date-based
//! aggregates but still count toward the history total.

use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};

use crate::models::record::JobRecord;
use crate::models::reporting::{DashboardSummary, LocationCount, RecentEntry};

const RECENT_LIMIT: usize = 5;
const WEEKLY_WINDOW_DAYS: u64 = 7;

pub fn dashboard_summary(records: &[JobRecord], today: NaiveDate) -> DashboardSummary {
    let today_records: Vec<&JobRecord> = records
        .iter()
        .filter(|r| r.date.as_day() == Some(today))
        .collect();

    let today_locations: HashSet<&str> = today_records
        .iter()
        .map(|r| r.location.as_str())
        .collect();

    DashboardSummary {
        today_jobs: today_records.len(),
        today_locations: today_locations.len(),
        total_records: records.len(),
        weekly_locations: weekly_location_counts(records, today),
        recent: recent_entries(records),
    }
}

/// Per-location activity over the trailing week, most active location first.
fn weekly_location_counts(records: &[JobRecord], today: NaiveDate) -> Vec<LocationCount> {
    let window_start = today
        .checked_sub_days(Days::new(WEEKLY_WINDOW_DAYS))
        .unwrap_or(today);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(day) = record.date.as_day() {
            if day >= window_start {
                *counts.entry(record.location.as_str()).or_default() += 1;
            }
        }
    }

    let mut ordered: Vec<LocationCount> = counts
        .into_iter()
        .map(|(location, count)| LocationCount {
            location: location.to_string(),
            count,
        })
        .collect();
    ordered.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)));
    ordered
}

/// The tail of the history, oldest of the window first.
fn recent_entries(records: &[JobRecord]) -> Vec<RecentEntry> {
    let start = records.len().saturating_sub(RECENT_LIMIT);
    records[start..]
        .iter()
        .map(|r| RecentEntry {
            location: r.location.clone(),
            progress: r.progress,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Progress, RecordDate, NO_IMAGE};

    fn record(date: &str, location: &str, progress: i64) -> JobRecord {
        JobRecord {
            date: RecordDate::parse(date),
            technician: "tech-a".to_string(),
            location: location.to_string(),
            task: "taskA".to_string(),
            team: String::new(),
            image_reference: NO_IMAGE.to_string(),
            progress: Progress::from_percent(progress),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn empty_snapshot_yields_zeroes() {
        let summary = dashboard_summary(&[], today());
        assert_eq!(summary.today_jobs, 0);
        assert_eq!(summary.total_records, 0);
        assert!(summary.weekly_locations.is_empty());
        assert!(summary.recent.is_empty());
    }

    #[test]
    fn today_counts_distinct_locations() {
        let records = vec![
            record("2024-03-10", "loc1", 20),
            record("2024-03-10", "loc1", 50),
            record("2024-03-10", "loc2", 10),
            record("2024-03-09", "loc3", 90),
        ];
        let summary = dashboard_summary(&records, today());
        assert_eq!(summary.today_jobs, 3);
        assert_eq!(summary.today_locations, 2);
        assert_eq!(summary.total_records, 4);
    }

    #[test]
    fn weekly_counts_exclude_old_and_unparsed_dates() {
        let records = vec![
            record("2024-03-09", "loc1", 20),
            record("2024-03-05", "loc1", 40),
            record("2024-02-01", "loc1", 60),
            record("not a date", "loc1", 80),
            record("2024-03-08", "loc2", 10),
        ];
        let summary = dashboard_summary(&records, today());
        assert_eq!(
            summary.weekly_locations,
            vec![
                LocationCount { location: "loc1".to_string(), count: 2 },
                LocationCount { location: "loc2".to_string(), count: 1 },
            ]
        );
        // The unparsed row still counts toward the total.
        assert_eq!(summary.total_records, 5);
    }

    #[test]
    fn recent_keeps_the_last_five_in_order() {
        let records: Vec<JobRecord> = (1..=7)
            .map(|i| record("2024-03-10", &format!("loc{i}"), 10 * i))
            .collect();
        let summary = dashboard_summary(&records, today());
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[0].location, "loc3");
        assert_eq!(summary.recent[4].location, "loc7");
    }
}
