//! Record store adapter over the Google Sheets v4 values API.
//!
//! The sheet is treated as an append-only table: the first row is a header
//! naming the logical columns, every later row is one immutable [`JobRecord`].
//! Reads degrade to "no data" when the sheet is empty or the header lacks a
//! required column; only appends escalate failures.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::models::record::{HeaderMap, JobRecord};
use crate::services::auth::TokenProvider;
use crate::services::{RecordStore, StoreError};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Client for one spreadsheet range acting as the job record table.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    auth: Arc<TokenProvider>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str, range: &str, auth: Arc<TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: SHEETS_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            auth,
        }
    }

    /// Cheap reachability probe for health checks: fetch the header cell only.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        let token = self.auth.bearer_token().await?;
        let url = format!(
            "{}/{}/values/{}!A1",
            self.base_url, self.spreadsheet_id, self.range
        );
        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Api(response.status().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SheetsClient {
    async fn read_all(&self) -> Result<Vec<JobRecord>, StoreError> {
        let token = self.auth.bearer_token().await?;
        let url = format!(
            "{}/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.range
        );

        let response = self.http.get(&url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("values read failed: {status}: {body}")));
        }

        let body: ValueRange = response.json().await?;
        Ok(rows_to_records(&body.values))
    }

    async fn append(&self, record: &JobRecord) -> Result<(), StoreError> {
        let token = self.auth.bearer_token().await?;
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.base_url, self.spreadsheet_id, self.range
        );

        let body = serde_json::json!({ "values": [record.to_row()] });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("row append failed: {status}: {body}")));
        }

        Ok(())
    }
}

/// Convert raw sheet values into records. The first row must be the header;
/// a missing or incomplete header yields no records, not an error.
fn rows_to_records(values: &[Vec<serde_json::Value>]) -> Vec<JobRecord> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Vec::new();
    };

    let header_cells: Vec<String> = header_row.iter().map(cell_text).collect();
    let Some(header) = HeaderMap::from_header_row(&header_cells) else {
        warn!("sheet header is missing required columns, treating as no data");
        return Vec::new();
    };

    data_rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            JobRecord::from_row(&header, &cells)
        })
        .collect()
}

/// The values API may hand back numbers for numeric-looking cells.
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
