//! Entry/update submission pipeline.
//!
//! Each submission produces exactly one appended record. Update mode carries
//! identity fields over from the resolved prior record and refreshes only the
//! date and progress. The evidence photo is best-effort: resize and upload
//! failures downgrade to warnings and the record is appended with the
//! "No Image" sentinel. Only the final row append can fail a submission.

use std::io::Cursor;
use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use tracing::{info, warn};

use crate::models::record::{JobRecord, Progress, RecordDate, NO_IMAGE};
use crate::models::submission::{SubmissionInput, SubmissionMode, SubmissionReceipt};
use crate::services::{resolution, AssetStore, RecordStore, StoreError};

/// Evidence photos are downsampled to fit this bounding box, aspect preserved.
const PHOTO_MAX_DIMENSION: u32 = 1024;

/// Fixed JPEG re-encode quality for uploaded photos.
const PHOTO_JPEG_QUALITY: u8 = 65;

/// What happened to the evidence photo before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// No photo was supplied.
    None,
    /// Upload succeeded; the link becomes the record's image reference.
    Uploaded(String),
    /// Resize or upload failed; carries the warning shown to the user.
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("update mode requires selecting an ongoing job")]
    MissingSelection,

    #[error("no ongoing job matches the selected entry")]
    NoOngoingJob,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run one submission end to end: resolve the prior record (update mode),
/// process and upload the photo (best-effort), assemble the record, append it,
/// and produce the shareable summary.
pub async fn submit(
    store: &dyn RecordStore,
    assets: &dyn AssetStore,
    input: SubmissionInput,
    photo: Option<Vec<u8>>,
) -> Result<SubmissionReceipt, SubmissionError> {
    let started = Instant::now();

    let prior = match input.mode {
        SubmissionMode::NewJob => None,
        SubmissionMode::UpdateJob => {
            let identity = input
                .identity
                .as_ref()
                .ok_or(SubmissionError::MissingSelection)?;

            // A read failure degrades to an empty history, which surfaces
            // below as the safe "no ongoing job" state.
            let history = match store.read_all().await {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, "record read failed while resolving prior job");
                    Vec::new()
                }
            };

            Some(
                resolution::resolve(&history, identity)
                    .cloned()
                    .ok_or(SubmissionError::NoOngoingJob)?,
            )
        }
    };

    let photo_outcome = match photo {
        None => PhotoOutcome::None,
        Some(bytes) => upload_photo(assets, &input, prior.as_ref(), bytes).await,
    };

    let record = assemble(&input, prior.as_ref(), &photo_outcome)?;

    store.append(&record).await?;

    metrics::counter!("records_submitted_total").increment(1);
    metrics::histogram!("submission_seconds").record(started.elapsed().as_secs_f64());
    info!(
        location = %record.location,
        progress = record.progress.percent(),
        mode = %input.mode,
        "record appended"
    );

    let mut warnings = Vec::new();
    if let PhotoOutcome::Failed(reason) = &photo_outcome {
        warnings.push(reason.clone());
    }

    let summary = share_summary(&record);
    Ok(SubmissionReceipt {
        record,
        summary,
        warnings,
    })
}

/// Build the one record to append. Pure: all remote effects happen before.
///
/// New-job mode takes every field from fresh input; update mode carries
/// `technician`, `location`, `team` and `task` over from the prior record and
/// refreshes only `date` and `progress`.
pub fn assemble(
    input: &SubmissionInput,
    prior: Option<&JobRecord>,
    photo: &PhotoOutcome,
) -> Result<JobRecord, SubmissionError> {
    let image_reference = match photo {
        PhotoOutcome::Uploaded(link) => link.clone(),
        PhotoOutcome::None | PhotoOutcome::Failed(_) => NO_IMAGE.to_string(),
    };

    let date = RecordDate::parse(&input.date);
    let progress = Progress::from_percent(input.progress);

    let record = match input.mode {
        SubmissionMode::NewJob => JobRecord {
            date,
            technician: input.technician.clone(),
            location: input.location.clone(),
            task: input.task.clone(),
            team: input.team.join(", "),
            image_reference,
            progress,
        },
        SubmissionMode::UpdateJob => {
            let prior = prior.ok_or(SubmissionError::NoOngoingJob)?;
            JobRecord {
                date,
                technician: prior.technician.clone(),
                location: prior.location.clone(),
                task: prior.task.clone(),
                team: prior.team.clone(),
                image_reference,
                progress,
            }
        }
    };

    Ok(record)
}

/// Resize, re-encode and upload the photo. Never fails the submission.
async fn upload_photo(
    assets: &dyn AssetStore,
    input: &SubmissionInput,
    prior: Option<&JobRecord>,
    bytes: Vec<u8>,
) -> PhotoOutcome {
    // CPU-bound resize happens before any network call.
    let jpeg = match prepare_photo(&bytes) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            metrics::counter!("photo_upload_failures_total").increment(1);
            warn!(error = %e, "photo could not be processed");
            return PhotoOutcome::Failed(format!("Photo could not be processed: {e}"));
        }
    };

    // Update mode names the file after the job being updated.
    let (location, technician) = match (input.mode, prior) {
        (SubmissionMode::UpdateJob, Some(prior)) => (&prior.location, &prior.technician),
        _ => (&input.location, &input.technician),
    };
    let name = evidence_file_name(&input.date, location, technician);

    match assets.upload(jpeg, &name).await {
        Ok(link) => PhotoOutcome::Uploaded(link),
        Err(e) => {
            metrics::counter!("photo_upload_failures_total").increment(1);
            warn!(error = %e, file = %name, "photo upload failed, proceeding without image");
            PhotoOutcome::Failed(format!("Photo upload failed: {e}"))
        }
    }
}

/// Downsample to fit [`PHOTO_MAX_DIMENSION`] square (aspect preserved, never
/// upscaled) and re-encode as JPEG at fixed quality.
fn prepare_photo(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;

    let resized = if decoded.width() > PHOTO_MAX_DIMENSION || decoded.height() > PHOTO_MAX_DIMENSION
    {
        decoded.thumbnail(PHOTO_MAX_DIMENSION, PHOTO_MAX_DIMENSION)
    } else {
        decoded
    };

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, PHOTO_JPEG_QUALITY);
    resized.to_rgb8().write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

/// Upload file name: `{date}_{location}_{technician}.jpg`, with any path
/// separator in the technician identity replaced.
fn evidence_file_name(date: &str, location: &str, technician: &str) -> String {
    let safe_technician = technician.replace('/', "-");
    format!("{date}_{location}_{safe_technician}.jpg")
}

fn share_summary(record: &JobRecord) -> String {
    format!(
        "*FIELD OPS UPDATE*\n📅 {}\n📍 {}\n📊 Progress: {}\n🖼 {}",
        record.date, record.location, record.progress, record.image_reference
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::JobIdentity;

    fn new_job_input() -> SubmissionInput {
        SubmissionInput {
            mode: SubmissionMode::NewJob,
            date: "2024-03-01".to_string(),
            progress: 50,
            technician: "tech-a".to_string(),
            location: "loc1".to_string(),
            task: "taskA".to_string(),
            team: vec!["tech-b".to_string(), "tech-c".to_string()],
            identity: None,
        }
    }

    fn prior_record() -> JobRecord {
        JobRecord {
            date: RecordDate::parse("2024-01-01"),
            technician: "tech-lead".to_string(),
            location: "loc9".to_string(),
            task: "long running repair".to_string(),
            team: "tech-x, tech-y".to_string(),
            image_reference: NO_IMAGE.to_string(),
            progress: Progress::from_percent(20),
        }
    }

    #[test]
    fn new_job_takes_all_fields_from_input() {
        let record = assemble(&new_job_input(), None, &PhotoOutcome::None).unwrap();
        assert_eq!(record.technician, "tech-a");
        assert_eq!(record.location, "loc1");
        assert_eq!(record.team, "tech-b, tech-c");
        assert_eq!(record.progress.percent(), 50);
        assert_eq!(record.image_reference, NO_IMAGE);
    }

    #[test]
    fn empty_team_serializes_to_empty_string() {
        let mut input = new_job_input();
        input.team.clear();
        let record = assemble(&input, None, &PhotoOutcome::None).unwrap();
        assert_eq!(record.team, "");
    }

    #[test]
    fn update_carries_identity_fields_from_prior() {
        let mut input = new_job_input();
        input.mode = SubmissionMode::UpdateJob;
        input.identity = Some(JobIdentity {
            location: "loc9".to_string(),
            task: "long running repair".to_string(),
        });
        input.progress = 70;

        let record = assemble(&input, Some(&prior_record()), &PhotoOutcome::None).unwrap();
        assert_eq!(record.technician, "tech-lead");
        assert_eq!(record.location, "loc9");
        assert_eq!(record.task, "long running repair");
        assert_eq!(record.team, "tech-x, tech-y");
        // Only date and progress are refreshed.
        assert_eq!(record.date, RecordDate::parse("2024-03-01"));
        assert_eq!(record.progress.percent(), 70);
    }

    #[test]
    fn update_without_prior_is_a_safe_error() {
        let mut input = new_job_input();
        input.mode = SubmissionMode::UpdateJob;
        let result = assemble(&input, None, &PhotoOutcome::None);
        assert!(matches!(result, Err(SubmissionError::NoOngoingJob)));
    }

    #[test]
    fn failed_photo_falls_back_to_sentinel() {
        let record = assemble(
            &new_job_input(),
            None,
            &PhotoOutcome::Failed("Photo upload failed: boom".to_string()),
        )
        .unwrap();
        assert_eq!(record.image_reference, NO_IMAGE);
    }

    #[test]
    fn uploaded_photo_link_becomes_the_reference() {
        let record = assemble(
            &new_job_input(),
            None,
            &PhotoOutcome::Uploaded("https://drive.example/view/abc".to_string()),
        )
        .unwrap();
        assert_eq!(record.image_reference, "https://drive.example/view/abc");
    }

    #[test]
    fn unparseable_date_is_stored_as_raw_text() {
        let mut input = new_job_input();
        input.date = "sometime soon".to_string();
        let record = assemble(&input, None, &PhotoOutcome::None).unwrap();
        assert_eq!(record.date.to_string(), "sometime soon");
    }

    #[test]
    fn out_of_range_progress_is_clamped_and_stepped() {
        let mut input = new_job_input();
        input.progress = 137;
        let record = assemble(&input, None, &PhotoOutcome::None).unwrap();
        assert_eq!(record.progress.percent(), 100);

        input.progress = -3;
        let record = assemble(&input, None, &PhotoOutcome::None).unwrap();
        assert_eq!(record.progress.percent(), 0);
    }

    #[test]
    fn file_name_replaces_path_separators() {
        let name = evidence_file_name("2024-03-01", "loc1", "a/b tech");
        assert_eq!(name, "2024-03-01_loc1_a-b tech.jpg");
    }

    #[test]
    fn summary_lists_date_location_progress_and_image() {
        let record = assemble(&new_job_input(), None, &PhotoOutcome::None).unwrap();
        let summary = share_summary(&record);
        assert!(summary.contains("2024-03-01"));
        assert!(summary.contains("loc1"));
        assert!(summary.contains("50%"));
        assert!(summary.contains(NO_IMAGE));
    }
}
