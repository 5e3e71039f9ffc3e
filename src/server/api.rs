//! OtaServe API Module
//! Firmware update-check and device log REST endpoints

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::server::artifacts::ArtifactStore;
use crate::server::auth;
use crate::server::config::{AuthConfig, Config};
use crate::server::delivery::{self, Decision};
use crate::server::error::ApiError;
use crate::server::logsink::LogSink;
use crate::server::version::VersionDescriptor;

/// Header carrying the device's build descriptor on update checks.
pub const VERSION_HEADER: &str = "x-esp8266-version";

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<ArtifactStore>,
    pub logs: Arc<LogSink>,
    pub auth: AuthConfig,
}

impl ApiState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: Arc::new(ArtifactStore::new(config.paths.firmware_dir.clone())),
            logs: Arc::new(LogSink::new(config.paths.log_dir.clone())),
            auth: config.auth.clone(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_firmware,
        append_log,
    ),
    tags(
        (name = "firmware", description = "Conditional firmware delivery"),
        (name = "log", description = "Device log ingestion"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/firmware", get(get_firmware))
        .route("/log", post(append_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/firmware",
    params(
        ("x-esp8266-version" = String, Header, description = "Device build descriptor: <name>-<Mon D YYYY>-<HH:MM:SS>"),
    ),
    responses(
        (status = 200, description = "Newer firmware, binary attached", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 304, description = "Device firmware is current"),
        (status = 400, description = "Missing or invalid descriptor"),
        (status = 404, description = "No such artifact"),
        (status = 401, description = "Unauthorized"),
    ),
    tag = "firmware"
)]
async fn get_firmware(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let raw = headers
        .get(VERSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingVersion)?;

    let descriptor = VersionDescriptor::parse(raw)?;
    let record = state.store.lookup(&descriptor.artifact)?;

    match delivery::negotiate(&descriptor, &record) {
        Decision::NotModified => {
            tracing::debug!(artifact = %record.name, "device is current");
            Ok(StatusCode::NOT_MODIFIED.into_response())
        }
        Decision::Deliver => {
            tracing::info!(
                artifact = %record.name,
                built_at = %descriptor.built_at,
                modified_at = %record.modified_at,
                "delivering firmware"
            );
            let file = tokio::fs::File::open(&record.path).await?;
            let body = Body::from_stream(ReaderStream::new(file));
            let headers = [
                (
                    header::CONTENT_TYPE,
                    "application/octet-stream".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.bin\"", record.name),
                ),
            ];
            Ok((headers, body).into_response())
        }
    }
}

#[derive(Deserialize)]
pub struct LogRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[utoipa::path(
    post,
    path = "/log",
    request_body = Value,
    responses(
        (status = 200, description = "Fragment appended", body = Value),
        (status = 400, description = "id or content missing", body = Value),
        (status = 500, description = "Append failed", body = Value),
        (status = 401, description = "Unauthorized"),
    ),
    tag = "log"
)]
async fn append_log(
    State(state): State<ApiState>,
    Json(request): Json<LogRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(id), Some(content)) = (request.id, request.content) else {
        return Err(ApiError::MissingLogField);
    };

    // Transports percent-encode fragments; decode before storage. Invalid
    // UTF-8 sequences degrade to replacement characters rather than failing.
    let decoded = percent_decode_str(&content).decode_utf8_lossy();
    state.logs.append(&id, &decoded).await?;

    tracing::debug!(device = %id, bytes = decoded.len(), "appended log fragment");
    Ok(Json(json!({ "message": "Log appended successfully" })))
}
