use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::stores::{CreateStoreRequest, StoreList},
    error::AppResult,
    middleware::tenant::ActorContext,
    models::Store,
    response::ApiResponse,
    routes::params::Pagination,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/{id}", get(get_store))
}

#[utoipa::path(
    get,
    path = "/stores",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List stores (admin only)", body = ApiResponse<StoreList>),
        (status = 403, description = "Forbidden"),
    ),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    ctx: ActorContext,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    let resp = store_service::list_stores(&state, &ctx, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 200, description = "Create a store (admin only)", body = ApiResponse<Store>),
        (status = 403, description = "Forbidden"),
    ),
    tag = "Stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    ctx: ActorContext,
    Json(payload): Json<CreateStoreRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::create_store(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/stores/{id}",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Get a store (admin only)", body = ApiResponse<Store>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Stores"
)]
pub async fn get_store(
    State(state): State<AppState>,
    ctx: ActorContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::get_store(&state, &ctx, id).await?;
    Ok(Json(resp))
}
