use actix_web::{http::StatusCode, web, HttpMessage, HttpRequest, HttpResponse};
use serde_json::{Map, Value};

use crate::models::UpstreamErrorResponse;
use crate::routes::{AppState, JsonError};
use crate::services::backend::token_segment;
use crate::services::{BackendClient, Forwarded, UpstreamMethod};

/// Mapping from a public `/api` path to its backend counterpart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    pub method: UpstreamMethod,
    pub upstream: String,
}

impl ProxyRoute {
    pub fn submit() -> Self {
        Self {
            method: UpstreamMethod::Post,
            upstream: "/submit".to_string(),
        }
    }

    pub fn track_conversion(token: &str) -> Self {
        Self {
            method: UpstreamMethod::Post,
            upstream: format!("/track-conversion/{}", token_segment(token)),
        }
    }

    pub fn result(token: &str) -> Self {
        Self {
            method: UpstreamMethod::Get,
            upstream: format!("/result/{}", token_segment(token)),
        }
    }
}

/// Configure the relayed `/api` routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/submit", web::post().to(submit))
        .route("/track-conversion/{token}", web::post().to(track_conversion))
        .route("/result/{token}", web::get().to(get_result));
}

/// Forward one request and mirror the backend's status and JSON body
///
/// Any failure to reach the backend or read its reply becomes a 500 with
/// the underlying error text in `detail`.
pub async fn relay(backend: &BackendClient, route: &ProxyRoute, body: Option<Value>) -> HttpResponse {
    tracing::info!("[proxy] {} /api{} -> {}", route.method, route.upstream, route.upstream);

    match backend.forward(route.method, &route.upstream, body.as_ref()).await {
        Ok(Forwarded { status, body }) => {
            tracing::info!("[proxy] backend responded {} for {}", status, route.upstream);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status)
                .content_type("application/json")
                .body(body)
        }
        Err(e) => {
            tracing::error!("[proxy] {} {} failed: {}", route.method, route.upstream, e);
            HttpResponse::InternalServerError().json(UpstreamErrorResponse::unavailable(e.to_string()))
        }
    }
}

/// Decode an incoming submit body into the JSON sent upstream
///
/// JSON and form-encoded bodies are decoded; an empty body or any other
/// content type relays `{}` and lets the backend decide. Only a body
/// declared as JSON that fails to parse is rejected here.
pub fn submission_body(content_type: &str, bytes: &[u8]) -> Result<Value, JsonError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match content_type {
        "application/json" => serde_json::from_slice(bytes).map_err(JsonError::invalid_json),
        ct if ct.ends_with("+json") => serde_json::from_slice(bytes).map_err(JsonError::invalid_json),
        "application/x-www-form-urlencoded" => Ok(Value::Object(
            url::form_urlencoded::parse(bytes)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect(),
        )),
        other => {
            tracing::debug!("[proxy] ignoring submit body with content type {:?}", other);
            Ok(Value::Object(Map::new()))
        }
    }
}

/// POST /api/submit
async fn submit(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, JsonError> {
    let payload = submission_body(&req.content_type().to_ascii_lowercase(), &body)?;
    Ok(relay(&state.backend, &ProxyRoute::submit(), Some(payload)).await)
}

/// POST /api/track-conversion/{token}
async fn track_conversion(state: web::Data<AppState>, token: web::Path<String>) -> HttpResponse {
    relay(&state.backend, &ProxyRoute::track_conversion(&token), None).await
}

/// GET /api/result/{token}
async fn get_result(state: web::Data<AppState>, token: web::Path<String>) -> HttpResponse {
    relay(&state.backend, &ProxyRoute::result(&token), None).await
}
