use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::products::{
        CreateProductRequest, InventoryAdjustRequest, ProductList, UpdateProductRequest,
    },
    error::AppResult,
    middleware::tenant::TenantContext,
    models::Product,
    response::ApiResponse,
    routes::params::{LowStockQuery, ProductQuery},
    services::{inventory_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/{id}/inventory", patch(adjust_inventory))
}

#[utoipa::path(
    get,
    path = "/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search name or description"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List the store's products", body = ApiResponse<ProductList>),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/products/low-stock",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Products at or below their reorder threshold", body = ApiResponse<ProductList>),
    ),
    tag = "Products"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = inventory_service::list_low_stock(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create a product (admin only)", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get a product", body = ApiResponse<Product>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update a product (admin only)", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Delete a product (admin only)"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/products/{id}/inventory",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Apply a signed stock delta (admin only)", body = ApiResponse<Product>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = inventory_service::adjust_inventory(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}
