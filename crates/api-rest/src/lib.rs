//! # API REST
//!
//! REST API for the DVA notification provider.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (FHIR content types, CORS, request tracing)
//!
//! Notification bodies are read as raw bytes: partners send `application/json+fhir`, which the
//! axum `Json` extractor does not accept. Parsing, correlation and scheduling live in `dva-core`.

#![warn(rust_2018_idioms)]

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use dva_core::receiver::rejection_reason;
use dva_core::MessageReceiver;
use fhir::FHIR_JSON_MIME;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    receiver: MessageReceiver,
}

impl AppState {
    pub fn new(receiver: MessageReceiver) -> Self {
        Self { receiver }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Query parameters of `$process-message`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProcessMessageParams {
    /// Whether the sender expects asynchronous processing. Delivery is always asynchronous.
    #[serde(rename = "async", default)]
    pub async_: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, create_bundle, process_message),
    components(schemas(HealthRes))
)]
pub struct ApiDoc;

/// Build the REST router.
///
/// Routes:
/// - `POST /Bundle`
/// - `POST /$process-message`
/// - `GET /health`
/// - `GET /api-docs/openapi.json`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/Bundle", post(create_bundle))
        .route("/$process-message", post(process_message))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "DVA provider is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/Bundle",
    request_body(content = String, description = "FHIR message Bundle", content_type = "application/json+fhir"),
    responses(
        (status = 200, description = "Acknowledgement bundle with the inbound bundle id", body = String, content_type = "application/json+fhir"),
        (status = 400, description = "Body is not a FHIR Bundle")
    )
)]
/// Accept a notification bundle
///
/// Logs the payload, schedules the delayed response and answers with the acknowledgement.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not JSON, or
/// - the body is not a FHIR `Bundle`.
#[axum::debug_handler]
async fn create_bundle(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, (StatusCode, &'static str)> {
    acknowledge(&state, &body)
}

#[utoipa::path(
    post,
    path = "/$process-message",
    params(ProcessMessageParams),
    request_body(content = String, description = "FHIR message Bundle", content_type = "application/json+fhir"),
    responses(
        (status = 200, description = "Acknowledgement bundle with the inbound bundle id", body = String, content_type = "application/json+fhir"),
        (status = 400, description = "Body is not a FHIR Bundle")
    )
)]
/// FHIR `$process-message` operation
///
/// Behaves like `POST /Bundle`. The `async` flag is recorded in the log only.
#[axum::debug_handler]
async fn process_message(
    State(state): State<AppState>,
    Query(params): Query<ProcessMessageParams>,
    body: Bytes,
) -> Result<Response, (StatusCode, &'static str)> {
    tracing::info!(async_flag = params.async_, "$process-message invoked");
    acknowledge(&state, &body)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn acknowledge(state: &AppState, body: &[u8]) -> Result<Response, (StatusCode, &'static str)> {
    let receipt = state.receiver.receive(body).map_err(|e| {
        tracing::warn!("Rejected notification: {}", e);
        (StatusCode::BAD_REQUEST, rejection_reason(&e))
    })?;

    let ack = receipt.acknowledgement.to_json().map_err(|e| {
        tracing::error!("Acknowledgement error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    Ok(([(header::CONTENT_TYPE, FHIR_JSON_MIME)], ack).into_response())
}
