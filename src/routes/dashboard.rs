use axum::extract::State;
use axum::Json;
use tracing::warn;

use crate::app_state::AppState;
use crate::models::reporting::DashboardSummary;
use crate::services::{reporting, RecordStore};

/// GET /api/v1/dashboard — activity summary over the current snapshot.
/// Read failures degrade to the empty "no data" summary.
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    let records = match state.store.read_all().await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "record read failed, dashboard degrades to no data");
            Vec::new()
        }
    };

    let today = chrono::Local::now().date_naive();
    Json(reporting::dashboard_summary(&records, today))
}
