use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
    error::AppResult,
    middleware::tenant::TenantContext,
    models::Customer,
    response::ApiResponse,
    routes::params::CustomerQuery,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/{id}",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
}

#[utoipa::path(
    get,
    path = "/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search name or email")
    ),
    responses(
        (status = 200, description = "List the store's customers", body = ApiResponse<CustomerList>),
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<CustomerQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::list_customers(&state, &ctx, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Create a customer", body = ApiResponse<Customer>),
        (status = 400, description = "Validation failed"),
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::create_customer(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Get a customer", body = ApiResponse<Customer>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer(&state, &ctx, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Update contact details", body = ApiResponse<Customer>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_customer(&state, &ctx, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Delete a customer without orders"),
        (status = 400, description = "Customer still referenced by orders"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = customer_service::delete_customer(&state, &ctx, id).await?;
    Ok(Json(resp))
}
