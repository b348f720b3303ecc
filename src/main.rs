mod app_state;
mod config;
mod models;
mod routes;
mod services;

use axum::response::Html;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::auth::TokenProvider;
use services::drive::DriveClient;
use services::sheets::SheetsClient;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing field-ops-tracker server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("records_submitted_total", "Total job records appended");
    metrics::describe_counter!(
        "photo_upload_failures_total",
        "Evidence photo uploads that failed and fell back to the no-image sentinel"
    );
    metrics::describe_histogram!(
        "submission_seconds",
        "Time to run one submission end to end"
    );

    // Load the service-account credential bundle. Its absence is a fatal
    // configuration error.
    tracing::info!("Loading Google service-account credentials");
    let auth = Arc::new(
        TokenProvider::from_key_file(&config.service_account_key_path)
            .expect("Failed to load service-account credentials"),
    );

    // Initialize the record store (Sheets) and asset store (Drive) adapters
    let store = SheetsClient::new(&config.spreadsheet_id, &config.sheet_range, Arc::clone(&auth));
    let assets = DriveClient::new(&config.drive_folder_id, Arc::clone(&auth));

    // Load the technician roster, if configured
    let roster = config.load_roster().expect("Failed to read roster file");
    tracing::info!(technicians = roster.len(), "Roster loaded");

    // Create shared application state
    let state = AppState::new(store, assets, roster);

    // Build API routes
    let app = Router::new()
        // Static UI (embedded at compile time)
        .route("/", get(|| async { Html(include_str!("../static/index.html")) }))
        // API endpoints
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/api/v1/records",
            get(routes::records::list_records).post(routes::records::submit_record),
        )
        .route("/api/v1/jobs/ongoing", get(routes::records::list_ongoing))
        .route("/api/v1/technicians", get(routes::records::list_technicians))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting field-ops-tracker on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
