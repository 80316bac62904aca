//! Pharmacy handlers: CRUD plus the nearest-pharmacy search.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use pharmacy_core::{
    CreatePharmacyInput, ListFilter, NearestQuery, Pharmacy, RankedPharmacy, UpdatePharmacyInput,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_proximity_error, map_rejection, map_store_error, map_validation_error, normalize_limit,
    ApiError, ApiResponse, AppState, Pagination,
};

const DEFAULT_RADIUS_KM: f64 = 5.0;
const DEFAULT_NEAREST_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NearestParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/pharmacies: list with optional name search and pagination.
pub(super) async fn list_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Pharmacy>>>, ApiError> {
    let rid = &req_id.0;
    let Query(query) = query.map_err(|e| map_rejection(rid, &e))?;

    let filter = ListFilter::new(
        query.search,
        normalize_limit(query.limit),
        query.offset.unwrap_or(0),
    );
    let page = state
        .store
        .list(&filter)
        .await
        .map_err(|e| map_store_error(rid, &e))?;

    Ok(Json(ApiResponse::ok(page.items).with_pagination(
        Pagination {
            total: page.total,
            offset: filter.offset,
            limit: filter.limit,
        },
    )))
}

/// GET /api/v1/pharmacies/{id}
pub(super) async fn get_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Pharmacy>>, ApiError> {
    let pharmacy = state
        .store
        .get(&id)
        .await
        .map_err(|e| map_store_error(&req_id.0, &e))?;
    Ok(Json(ApiResponse::ok(pharmacy)))
}

/// POST /api/v1/pharmacies: create a pharmacy.
pub(super) async fn create_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<CreatePharmacyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Pharmacy>>), ApiError> {
    let rid = &req_id.0;
    let Json(input) = body.map_err(|e| map_rejection(rid, &e))?;
    let new = input
        .validate()
        .map_err(|e| map_validation_error(rid, &e))?;

    let created = state
        .store
        .create(new)
        .await
        .map_err(|e| map_store_error(rid, &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(created).with_message("Pharmacy created successfully")),
    ))
}

/// PUT /api/v1/pharmacies/{id}: partial update; absent fields are left alone.
pub(super) async fn update_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePharmacyInput>, JsonRejection>,
) -> Result<Json<ApiResponse<Pharmacy>>, ApiError> {
    let rid = &req_id.0;
    let Json(input) = body.map_err(|e| map_rejection(rid, &e))?;
    let patch = input
        .validate()
        .map_err(|e| map_validation_error(rid, &e))?;

    let updated = state
        .store
        .update(&id, patch)
        .await
        .map_err(|e| map_store_error(rid, &e))?;

    Ok(Json(
        ApiResponse::ok(updated).with_message("Pharmacy updated successfully"),
    ))
}

/// DELETE /api/v1/pharmacies/{id}
pub(super) async fn delete_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .store
        .delete(&id)
        .await
        .map_err(|e| map_store_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse::<()>::message_only(
        true,
        "Pharmacy deleted successfully",
    )))
}

/// GET /api/v1/pharmacies/nearest: pharmacies within `radius` km, closest first.
///
/// The query is validated before the snapshot is read.
pub(super) async fn nearest_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<NearestParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<RankedPharmacy>>>, ApiError> {
    let rid = &req_id.0;
    let Query(params) = params.map_err(|e| map_rejection(rid, &e))?;

    let query = NearestQuery::new(
        params.latitude,
        params.longitude,
        params.radius.unwrap_or(DEFAULT_RADIUS_KM),
        params.limit.unwrap_or(DEFAULT_NEAREST_LIMIT),
    )
    .map_err(|e| map_proximity_error(rid, &e))?;

    let snapshot = state
        .store
        .list_all()
        .await
        .map_err(|e| map_store_error(rid, &e))?;
    let scanned = snapshot.len();
    let ranked = query.rank(snapshot);

    tracing::debug!(
        request_id = %rid,
        scanned,
        returned = ranked.len(),
        latitude = query.latitude(),
        longitude = query.longitude(),
        radius_km = query.radius_km(),
        limit = query.limit(),
        "nearest search complete"
    );

    Ok(Json(ApiResponse::ok(ranked)))
}
