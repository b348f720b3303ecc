use std::sync::Arc;

use crate::services::{drive::DriveClient, sheets::SheetsClient};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SheetsClient>,
    pub assets: Arc<DriveClient>,
    pub roster: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(store: SheetsClient, assets: DriveClient, roster: Vec<String>) -> Self {
        Self {
            store: Arc::new(store),
            assets: Arc::new(assets),
            roster: Arc::new(roster),
        }
    }
}
