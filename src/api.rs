//! HTTP routes.

use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::models::{ExtractionFailure, ExtractionResult, VideoSourceResponse};
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{get, web, HttpResponse, Responder};

/// Status for an extraction result.
///
/// The compatible mode answers 200 for everything and carries the error in
/// the body; strict mode maps terminal failures to 502/404.
pub fn status_for(result: &ExtractionResult, strict: bool) -> StatusCode {
    if !strict {
        return StatusCode::OK;
    }
    match result.failure() {
        None => StatusCode::OK,
        Some(ExtractionFailure::PageNotFound) => StatusCode::BAD_GATEWAY,
        Some(ExtractionFailure::NoVideoServers) | Some(ExtractionFailure::NoValidLinks) => {
            StatusCode::NOT_FOUND
        }
    }
}

#[get("/video-source/{slug:.*}")]
async fn get_video_source(data: web::Data<AppState>, slug: web::Path<String>) -> impl Responder {
    let slug = slug.into_inner();
    log::info!("Video source requested for {}", slug);

    let result = data.extractor.extract(&slug).await;
    let status = status_for(&result, data.config.server.strict_status_codes);

    HttpResponse::build(status).json(VideoSourceResponse::from(result))
}

#[get("/metrics")]
async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.metrics.snapshot())
}

#[get("/metrics/summary")]
async fn get_metrics_summary(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(data.metrics.summary())
}

/// Cross-origin policy for browser clients. No configured origins means any
/// origin may call the API.
pub fn cors(server: &ServerConfig) -> Cors {
    if server.cors_allowed_origins.is_empty() {
        return Cors::permissive();
    }

    server
        .cors_allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}

/// Register every route on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_video_source)
        .service(get_metrics)
        .service(get_metrics_summary);
}
