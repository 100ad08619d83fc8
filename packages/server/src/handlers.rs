//! HTTP handler functions for the safety watch API.

use actix_web::{HttpRequest, HttpResponse, error, web};
use chrono::Utc;
use safety_watch_ingest::ServiceError;
use safety_watch_report_models::{ReportCategory, ReportId};
use safety_watch_server_models::{
    ApiError, ApiFeatures, ApiHealth, ApiHotspots, ApiReport, ApiStats, ApiSubmitReport,
    ApiSubmitReportResponse, ApiUpdateStatus,
};

use crate::AppState;

/// Turns an unreadable JSON body into a 400 with an [`ApiError`] body.
pub fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request body: {err}");
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    error::InternalError::from_response(err, response).into()
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: ApiFeatures {
            hotspot_detection: true,
            media_references: true,
        },
    })
}

/// `GET /api/categories`
///
/// Returns the display names of every report category.
pub async fn categories() -> HttpResponse {
    let names: Vec<String> = ReportCategory::all()
        .iter()
        .map(ToString::to_string)
        .collect();

    HttpResponse::Ok().json(names)
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let stats = state.service.stats();
    HttpResponse::Ok().json(ApiStats {
        reports_submitted: stats.reports_submitted,
        incidents_recorded: stats.incidents_recorded,
        community_members: stats.community_members,
    })
}

/// `POST /api/reports`
///
/// Stores a new report and reports whether it completed a hotspot.
pub async fn submit_report(
    state: web::Data<AppState>,
    body: web::Json<ApiSubmitReport>,
) -> HttpResponse {
    match state
        .service
        .submit_report(body.into_inner().into(), Utc::now())
        .await
    {
        Ok(outcome) => HttpResponse::Created().json(ApiSubmitReportResponse::new(
            outcome.report.id,
            outcome.detection,
        )),
        Err(ServiceError::Validation(e)) => {
            log::debug!("Rejected submission: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(e) => {
            log::error!("Failed to submit report: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to submit report"))
        }
    }
}

/// `GET /api/reports`
///
/// Lists every stored report in submission order.
pub async fn list_reports(state: web::Data<AppState>) -> HttpResponse {
    let reports: Vec<ApiReport> = state
        .service
        .list_reports()
        .into_iter()
        .map(ApiReport::from)
        .collect();

    HttpResponse::Ok().json(reports)
}

/// `GET /api/reports/{id}`
pub async fn get_report(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = ReportId::new(path.into_inner());

    match state.service.get_report(&id) {
        Ok(report) => HttpResponse::Ok().json(ApiReport::from(report)),
        Err(e) => error_response(&e, "Failed to fetch report"),
    }
}

/// `PATCH /api/reports/{id}/status`
pub async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ApiUpdateStatus>,
) -> HttpResponse {
    let id = ReportId::new(path.into_inner());

    match state.service.update_status(&id, body.status) {
        Ok(report) => HttpResponse::Ok().json(ApiReport::from(report)),
        Err(e) => error_response(&e, "Failed to update report status"),
    }
}

/// `GET /api/hotspots`
///
/// Groups recent geolocated reports into hotspots as of now.
pub async fn hotspots(state: web::Data<AppState>) -> HttpResponse {
    let listing = state.service.list_hotspots(Utc::now());

    HttpResponse::Ok().json(ApiHotspots {
        hotspots: listing.hotspots,
        total_active: listing.total_active,
    })
}

fn error_response(e: &ServiceError, context: &str) -> HttpResponse {
    if e.is_not_found() {
        HttpResponse::NotFound().json(ApiError::new(e.to_string()))
    } else {
        log::error!("{context}: {e}");
        HttpResponse::InternalServerError().json(ApiError::new(context))
    }
}
