use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use common::ApiResponse;
use models::service_provider::Model;
use serde::Serialize;
use serde_json::Value;
use service::pagination::Pagination;
use service::service_provider::{
    CreateServiceProviderInput, StatusView, UpdateServiceProviderInput, VerificationView,
};
use tracing::info;

use crate::{errors::ApiError, extract::CurrentUser, state::ServerState};

/// List envelope: the usual `success`/`data` plus page bookkeeping.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

#[utoipa::path(
    get, path = "/service-providers", tag = "service-providers",
    params(crate::openapi::ListQueryDoc),
    responses(
        (status = 200, description = "Page of service providers"),
        (status = 400, description = "Filter value has the wrong type")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse>, ApiError> {
    let page = state.providers.list(&pairs).await?;
    info!(count = page.count, total = page.pagination.total, "list service providers");
    Ok(Json(ListResponse { success: true, count: page.count, pagination: page.pagination, data: page.data }))
}

#[utoipa::path(
    get, path = "/service-providers/{id}", tag = "service-providers",
    params(("id" = String, Path, description = "Service provider id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ServiceProviderDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let m = state.providers.get(&id).await?;
    Ok(Json(ApiResponse::ok(m)))
}

#[utoipa::path(
    post, path = "/service-providers", tag = "service-providers",
    request_body = crate::openapi::CreateServiceProviderDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ServiceProviderDoc),
        (status = 400, description = "Validation Error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(requester): CurrentUser,
    body: Result<Json<CreateServiceProviderInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Model>>), ApiError> {
    let Json(input) = body?;
    let m = state.providers.create(requester, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(m))))
}

#[utoipa::path(
    put, path = "/service-providers/{id}", tag = "service-providers",
    params(("id" = String, Path, description = "Service provider id")),
    request_body = crate::openapi::UpdateServiceProviderDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ServiceProviderDoc),
        (status = 400, description = "Validation Error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateServiceProviderInput>, JsonRejection>,
) -> Result<Json<ApiResponse<Model>>, ApiError> {
    let Json(input) = body?;
    let m = state.providers.update(requester, &id, input).await?;
    Ok(Json(ApiResponse::ok(m)))
}

#[utoipa::path(
    delete, path = "/service-providers/{id}", tag = "service-providers",
    params(("id" = String, Path, description = "Service provider id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    state.providers.delete(requester, &id).await?;
    Ok(Json(ApiResponse::done()))
}

#[utoipa::path(
    patch, path = "/service-providers/{id}/status", tag = "service-providers",
    params(("id" = String, Path, description = "Service provider id")),
    request_body = crate::openapi::StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = crate::openapi::StatusViewDoc),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn set_status(
    State(state): State<ServerState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<StatusView>>, ApiError> {
    let Json(body) = body?;
    let view = state.providers.set_status(requester, &id, &body).await?;
    Ok(Json(ApiResponse::ok(view)))
}

#[utoipa::path(
    patch, path = "/service-providers/{id}/verify", tag = "service-providers",
    params(("id" = String, Path, description = "Service provider id")),
    request_body = crate::openapi::VerificationRequest,
    responses(
        (status = 200, description = "Verification flag changed", body = crate::openapi::VerificationViewDoc),
        (status = 400, description = "isVerified is not a boolean"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn set_verification(
    State(state): State<ServerState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<VerificationView>>, ApiError> {
    let Json(body) = body?;
    let view = state.providers.set_verification(requester, &id, &body).await?;
    Ok(Json(ApiResponse::ok(view)))
}
