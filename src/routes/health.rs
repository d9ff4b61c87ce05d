use actix_web::{web, HttpResponse, Responder};

use crate::models::{BackendProbeResponse, HealthResponse};
use crate::routes::AppState;

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        time: chrono::Utc::now(),
        service: state.service_name.clone(),
    })
}

/// Backend connectivity diagnostic
///
/// GET /test-flask
pub async fn probe_backend(state: web::Data<AppState>) -> HttpResponse {
    let backend_url = state.backend.base_url().to_string();

    match state.backend.health().await {
        Ok(data) => HttpResponse::Ok().json(BackendProbeResponse {
            status: "ok".to_string(),
            backend_response: Some(data),
            error: None,
            backend_url,
        }),
        Err(e) => {
            tracing::warn!("Backend probe against {} failed: {}", backend_url, e);
            HttpResponse::InternalServerError().json(BackendProbeResponse {
                status: "error".to_string(),
                backend_response: None,
                error: Some(e.to_string()),
                backend_url,
            })
        }
    }
}
