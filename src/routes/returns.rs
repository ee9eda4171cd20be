use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::returns::{CreateReturnRequest, ReturnList, UpdateReturnStatusRequest},
    error::AppResult,
    middleware::tenant::TenantContext,
    models::Return,
    response::ApiResponse,
    routes::params::ReturnListQuery,
    services::return_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_returns).post(create_return))
        .route("/{id}", get(get_return))
        .route("/{id}/status", patch(update_return_status))
}

#[utoipa::path(
    get,
    path = "/returns",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("order_id" = Option<Uuid>, Query, description = "Filter by order")
    ),
    responses(
        (status = 200, description = "List the store's returns", body = ApiResponse<ReturnList>),
    ),
    tag = "Returns"
)]
pub async fn list_returns(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ReturnListQuery>,
) -> AppResult<Json<ApiResponse<ReturnList>>> {
    let resp = return_service::list_returns(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/returns",
    request_body = CreateReturnRequest,
    responses(
        (status = 200, description = "File a return against an order", body = ApiResponse<Return>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Returns"
)]
pub async fn create_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateReturnRequest>,
) -> AppResult<Json<ApiResponse<Return>>> {
    let resp = return_service::create_return(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/returns/{id}",
    params(("id" = Uuid, Path, description = "Return ID")),
    responses(
        (status = 200, description = "Get a return", body = ApiResponse<Return>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Returns"
)]
pub async fn get_return(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Return>>> {
    let resp = return_service::get_return(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/returns/{id}/status",
    params(("id" = Uuid, Path, description = "Return ID")),
    request_body = UpdateReturnStatusRequest,
    responses(
        (status = 200, description = "Apply a return status transition", body = ApiResponse<Return>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Transition not permitted"),
    ),
    tag = "Returns"
)]
pub async fn update_return_status(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReturnStatusRequest>,
) -> AppResult<Json<ApiResponse<Return>>> {
    let resp = return_service::update_return_status(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}
