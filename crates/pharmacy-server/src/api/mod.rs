mod pharmacies;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, Method, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use pharmacy_core::{PharmacyStore, ProximityError, StoreError, ValidationError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

const DEFAULT_LIST_LIMIT: i64 = 10;
const MAX_LIST_LIMIT: i64 = 100;
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PharmacyStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PharmacyStore>) -> Self {
        Self { store }
    }
}

/// Response envelope shared by every endpoint, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl ApiResponse<()> {
    /// A data-less envelope carrying only a message.
    pub fn message_only(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub request_id: String,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            code,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        tracing::debug!(
            request_id = %self.request_id,
            code = self.code,
            status = status.as_u16(),
            "request failed"
        );
        (
            status,
            Json(ApiResponse::<()>::message_only(false, self.message)),
        )
            .into_response()
    }
}

/// Default 10, clamped to `1..=100`.
pub(super) fn normalize_limit(limit: Option<i64>) -> u32 {
    let clamped = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    u32::try_from(clamped).unwrap_or(1)
}

pub(super) fn map_store_error(request_id: &str, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound => ApiError::new(request_id, "not_found", "Pharmacy not found"),
        StoreError::DuplicateKey { .. } => {
            ApiError::new(request_id, "conflict", format!("Duplicate entry: {error}"))
        }
        StoreError::Backend(_) => {
            tracing::error!(request_id, error = %error, "store operation failed");
            ApiError::new(request_id, "internal_error", INTERNAL_ERROR_MESSAGE)
        }
    }
}

pub(super) fn map_validation_error(request_id: &str, error: &ValidationError) -> ApiError {
    ApiError::new(request_id, "bad_request", error.to_string())
}

pub(super) fn map_proximity_error(request_id: &str, error: &ProximityError) -> ApiError {
    ApiError::new(request_id, "bad_request", error.to_string())
}

/// Malformed bodies and query strings get the envelope instead of axum's
/// plain-text rejection.
pub(super) fn map_rejection(request_id: &str, rejection: &impl std::fmt::Display) -> ApiError {
    tracing::debug!(request_id, rejection = %rejection, "request rejected by extractor");
    ApiError::new(request_id, "bad_request", rejection.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/pharmacies",
            get(pharmacies::list_pharmacies).post(pharmacies::create_pharmacy),
        )
        .route(
            "/api/v1/pharmacies/nearest",
            get(pharmacies::nearest_pharmacies),
        )
        .route(
            "/api/v1/pharmacies/{id}",
            get(pharmacies::get_pharmacy)
                .put(pharmacies::update_pharmacy)
                .delete(pharmacies::delete_pharmacy),
        )
}

pub fn build_app(state: AppState) -> Router {
    // request_id sits outermost so the trace span and CORS preflights see it.
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map_or("", |id| id.0.as_str());
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri(),
            request_id,
        )
    });

    api_router()
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(trace)
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(HealthData {
                status: "ok",
                store: "ok",
            })),
        ),
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "health check: store unavailable");
            let mut body = ApiResponse::ok(HealthData {
                status: "degraded",
                store: "unavailable",
            })
            .with_message("store unavailable");
            body.success = false;
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

async fn route_not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "Route not found")
}
