//! Field Ops Tracker
//!
//! This library provides the core functionality for the field-ops-tracker
//! system: field technicians log job updates into an append-only,
//! spreadsheet-backed record store, with photo evidence uploaded to Drive
//! and a dashboard summarizing recent activity.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
