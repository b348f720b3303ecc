use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::app_state::AppState;
use crate::models::record::JobRecord;
use crate::models::submission::{JobSummary, SubmissionInput, SubmissionReceipt};
use crate::services::submission::SubmissionError;
use crate::services::{resolution, submission, RecordStore};

/// POST /api/v1/records — submit a new-job or update-job entry.
///
/// Multipart form: a `payload` part carrying the JSON [`SubmissionInput`] and
/// an optional `photo` part with the raw evidence image.
pub async fn submit_record(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmissionReceipt>, (StatusCode, String)> {
    let mut input: Option<SubmissionInput> = None;
    let mut photo: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        match field.name() {
            Some("payload") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| (StatusCode::BAD_REQUEST, format!("bad payload: {e}")))?;
                input = Some(parsed);
            }
            Some("photo") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                photo = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let input = input.ok_or((StatusCode::BAD_REQUEST, "missing payload".to_string()))?;

    let receipt = submission::submit(state.store.as_ref(), state.assets.as_ref(), input, photo)
        .await
        .map_err(submission_error_response)?;

    Ok(Json(receipt))
}

/// GET /api/v1/records — full history listing.
/// Read failures degrade to an empty listing, not an error page.
pub async fn list_records(State(state): State<AppState>) -> Json<Vec<JobRecord>> {
    Json(snapshot(&state).await)
}

/// GET /api/v1/jobs/ongoing — distinct ongoing jobs for the update form.
pub async fn list_ongoing(State(state): State<AppState>) -> Json<Vec<JobSummary>> {
    let records = snapshot(&state).await;
    Json(resolution::list_ongoing_jobs(&records))
}

/// GET /api/v1/technicians — the configured roster for the entry form.
pub async fn list_technicians(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.roster.as_ref().clone())
}

async fn snapshot(state: &AppState) -> Vec<JobRecord> {
    match state.store.read_all().await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "record read failed, serving empty snapshot");
            Vec::new()
        }
    }
}

fn submission_error_response(error: SubmissionError) -> (StatusCode, String) {
    match &error {
        SubmissionError::MissingSelection | SubmissionError::NoOngoingJob => {
            (StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        SubmissionError::Store(_) => (StatusCode::BAD_GATEWAY, error.to_string()),
    }
}
