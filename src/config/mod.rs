use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// ID of the spreadsheet holding the job record table.
    pub spreadsheet_id: String,

    /// Sheet range to read and append (the tab name).
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,

    /// Drive folder receiving evidence photo uploads.
    pub drive_folder_id: String,

    /// Path to the Google service-account JSON key.
    pub service_account_key_path: String,

    /// Optional path to the technician roster (one identity per line).
    #[serde(default)]
    pub roster_path: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_sheet_range() -> String {
    "Sheet1".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Technician identities offered on the entry form, one per line in the
    /// configured roster file. No file configured means an empty roster.
    pub fn load_roster(&self) -> std::io::Result<Vec<String>> {
        let Some(path) = &self.roster_path else {
            return Ok(Vec::new());
        };
        let raw = std::fs::read_to_string(path)?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}
