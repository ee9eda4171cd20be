use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderList, UpdateOrderQuantityRequest, UpdateOrderStatusRequest,
    },
    error::AppResult,
    middleware::tenant::TenantContext,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order))
        .route("/{id}/status", patch(update_order_status))
        .route("/{id}/quantity", patch(update_order_quantity))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List the store's orders", body = ApiResponse<OrderList>),
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Create an order, resolving the customer", body = ApiResponse<Order>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::create_order(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get an order", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Apply an order status transition", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Transition not permitted"),
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order_status(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/quantity",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderQuantityRequest,
    responses(
        (status = 200, description = "Change quantity and recompute the total", body = ApiResponse<Order>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn update_order_quantity(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderQuantityRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order_quantity(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}
