#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for anonymous incident reports.
//!
//! Accepts report submissions, answers report lookups and status updates,
//! and lists the currently active hotspots. All state lives in an
//! in-memory [`ReportService`]; media uploads and email delivery are
//! handled by external collaborators.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safety_watch_hotspot_models::HotspotConfig;
use safety_watch_ingest::ReportService;

/// Shared application state.
pub struct AppState {
    /// Report store, hotspot engine, and notifier.
    pub service: ReportService,
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(handlers::json_error))
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/stats", web::get().to(handlers::stats))
            .route("/reports", web::post().to(handlers::submit_report))
            .route("/reports", web::get().to(handlers::list_reports))
            .route("/reports/{id}", web::get().to(handlers::get_report))
            .route(
                "/reports/{id}/status",
                web::patch().to(handlers::update_status),
            )
            .route("/hotspots", web::get().to(handlers::hotspots)),
    );
}

/// Starts the safety watch API server.
///
/// Loads the hotspot configuration from the environment, builds the
/// in-memory service, and serves the API. This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the hotspot configuration is
/// invalid, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = HotspotConfig::from_env().map_err(|e| {
        log::error!("Invalid hotspot configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let state = web::Data::new(AppState {
        service: ReportService::in_memory(config),
    });

    let config = state.service.config();
    log::info!(
        "Hotspot detection: radius {} deg, min {} reports, window {}s",
        config.radius,
        config.min_reports,
        config.time_window_secs()
    );

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
