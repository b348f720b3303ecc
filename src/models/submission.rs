use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::record::{JobIdentity, JobRecord};

/// Submission mode selected on the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionMode {
    NewJob,
    UpdateJob,
}

/// Fields collected from the entry form, before assembly.
///
/// In `NewJob` mode all fields are fresh input. In `UpdateJob` mode only
/// `date` and `progress` are read; the rest is carried over from the resolved
/// prior record identified by `identity`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionInput {
    pub mode: SubmissionMode,
    pub date: String,
    pub progress: i64,

    // New-job fields.
    #[serde(default)]
    pub technician: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub team: Vec<String>,

    // Update-mode job selection.
    #[serde(default)]
    pub identity: Option<JobIdentity>,
}

/// Outcome of a successful submission: the appended record, a shareable
/// summary, and any non-fatal warnings (photo upload problems).
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub record: JobRecord,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// One distinct ongoing job offered on the update form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub identity: JobIdentity,
    pub label: String,
    pub latest: JobRecord,
}
