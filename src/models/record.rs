use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Logical column names in the backing sheet. The first row of the sheet is a
/// header carrying these names; all reads go through a name-to-index mapping
/// rather than fixed positions.
pub const COLUMNS: [&str; 7] = [
    "Date",
    "Technician",
    "Location",
    "Task",
    "Team",
    "Image",
    "Progress",
];

/// Sentinel stored in the image column when no photo accompanies a record.
pub const NO_IMAGE: &str = "No Image";

/// Date format used for stored dates and upload file names.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar date, or the raw text the user typed when it did not parse.
///
/// Unparseable input is preserved verbatim and round-trips through the store
/// unchanged; only date-based aggregation skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordDate {
    Day(NaiveDate),
    Raw(String),
}

impl RecordDate {
    pub fn parse(input: &str) -> Self {
        match NaiveDate::parse_from_str(input.trim(), DATE_FORMAT) {
            Ok(day) => RecordDate::Day(day),
            Err(_) => RecordDate::Raw(input.to_string()),
        }
    }

    /// The parsed calendar day, if this date parsed.
    pub fn as_day(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Day(day) => Some(*day),
            RecordDate::Raw(_) => None,
        }
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Day(day) => write!(f, "{}", day.format(DATE_FORMAT)),
            RecordDate::Raw(text) => f.write_str(text),
        }
    }
}

impl From<String> for RecordDate {
    fn from(value: String) -> Self {
        RecordDate::parse(&value)
    }
}

impl From<RecordDate> for String {
    fn from(value: RecordDate) -> Self {
        value.to_string()
    }
}

/// Work progress as an integer percent, clamped to [0, 100] and stepped to
/// the nearest multiple of 10 at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64")]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);

    pub fn from_percent(value: i64) -> Self {
        let clamped = value.clamp(0, 100);
        // Round to the nearest step of 10.
        let stepped = ((clamped + 5) / 10) * 10;
        Progress(stepped.min(100) as u8)
    }

    /// Lenient cell parse: a non-numeric or missing value reads as 0.
    pub fn parse_cell(cell: &str) -> Self {
        cell.trim()
            .trim_end_matches('%')
            .parse::<i64>()
            .map(Progress::from_percent)
            .unwrap_or(Progress::ZERO)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl From<i64> for Progress {
    fn from(value: i64) -> Self {
        Progress::from_percent(value)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// The grouping key identifying a real-world job: two records with the same
/// location and task describe the same job at different points in time.
/// Derived at read time, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    pub location: String,
    pub task: String,
}

/// One immutable row of the append-only store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub date: RecordDate,
    pub technician: String,
    pub location: String,
    pub task: String,
    pub team: String,
    pub image_reference: String,
    pub progress: Progress,
}

impl JobRecord {
    pub fn identity(&self) -> JobIdentity {
        JobIdentity {
            location: self.location.clone(),
            task: self.task.clone(),
        }
    }

    /// Build a record from one sheet row using the validated header mapping.
    /// Missing cells read as empty; progress reads leniently.
    pub fn from_row(header: &HeaderMap, row: &[String]) -> Self {
        let cell = |name: &str| -> String {
            header
                .index_of(name)
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or_default()
        };

        JobRecord {
            date: RecordDate::parse(&cell("Date")),
            technician: cell("Technician"),
            location: cell("Location"),
            task: cell("Task"),
            team: cell("Team"),
            image_reference: cell("Image"),
            progress: Progress::parse_cell(&cell("Progress")),
        }
    }

    /// Serialize into storage order:
    /// `[date, technician, location, task, team, image_reference, progress]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.technician.clone(),
            self.location.clone(),
            self.task.clone(),
            self.team.clone(),
            self.image_reference.clone(),
            self.progress.percent().to_string(),
        ]
    }
}

/// Validated mapping from logical column names to positions in a sheet row.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    indices: HashMap<String, usize>,
}

impl HeaderMap {
    /// Map a header row by name. Returns `None` when any required column is
    /// absent; callers treat that as "no data", not an error.
    pub fn from_header_row(header: &[String]) -> Option<Self> {
        let indices: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        if COLUMNS.iter().any(|name| !indices.contains_key(*name)) {
            return None;
        }

        Some(HeaderMap { indices })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }
}
