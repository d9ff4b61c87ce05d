// Route exports
pub mod health;
pub mod proxy;

use actix_web::{error, http::StatusCode, web, HttpResponse};
use std::sync::Arc;

use crate::models::ErrorResponse;
use crate::services::BackendClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub service_name: String,
}

/// JSON error body returned by the gateway itself
#[derive(Debug)]
pub struct JsonError(ErrorResponse);

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

impl JsonError {
    /// 400 for a request body that claims to be JSON but does not parse
    pub fn invalid_json(err: impl std::fmt::Display) -> Self {
        JsonError(ErrorResponse {
            error: "invalid_json".to_string(),
            message: format!("Invalid JSON: {}", err),
            status_code: 400,
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/test-flask", web::get().to(health::probe_backend))
        .service(web::scope("/api").configure(proxy::configure));
}
