use serde::Serialize;

use crate::models::record::Progress;

/// Aggregates shown on the dashboard, all derived from one `read_all` snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Records logged today.
    pub today_jobs: usize,
    /// Distinct locations with activity today.
    pub today_locations: usize,
    /// Total rows in the store.
    pub total_records: usize,
    /// Per-location record counts over the trailing seven days, most active first.
    pub weekly_locations: Vec<LocationCount>,
    /// The five most recently appended entries.
    pub recent: Vec<RecentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEntry {
    pub location: String,
    pub progress: Progress,
}
