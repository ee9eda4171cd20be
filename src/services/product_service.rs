use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{
        ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
        Model as ProductModel,
    },
    error::{AppError, AppResult},
    middleware::tenant::{ensure_admin, TenantContext},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::inventory_service::is_low_stock,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    ctx: &TenantContext,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(ProductCol::StoreId.eq(ctx.store_id));

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProductCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProductCol::Description).ilike(pattern)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => ProductCol::CreatedAt,
        ProductSortBy::Price => ProductCol::Price,
        ProductSortBy::Name => ProductCol::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let product = find_scoped(state, ctx, id).await?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product),
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    ctx: &TenantContext,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(ctx)?;
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let active = ProductActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(ctx.store_id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        stock_quantity: Set(payload.stock_quantity),
        reorder_threshold: Set(payload.reorder_threshold),
        low_stock: Set(is_low_stock(payload.stock_quantity, payload.reorder_threshold)),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(ctx)?;
    let existing = find_scoped(state, ctx, id).await?;

    let stock_quantity = existing.stock_quantity;
    let mut reorder_threshold = existing.reorder_threshold;

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(threshold) = payload.reorder_threshold {
        reorder_threshold = threshold;
        active.reorder_threshold = Set(threshold);
    }
    // The low-stock flag follows every threshold change.
    active.low_stock = Set(is_low_stock(stock_quantity, reorder_threshold));

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(ctx)?;
    let existing = find_scoped(state, ctx, id).await?;

    Products::delete_by_id(existing.id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_scoped(state: &AppState, ctx: &TenantContext, id: Uuid) -> AppResult<ProductModel> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    match product {
        Some(p) if p.store_id == ctx.store_id => Ok(p),
        _ => Err(AppError::NotFound),
    }
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        store_id: model.store_id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock_quantity: model.stock_quantity,
        reorder_threshold: model.reorder_threshold,
        low_stock: model.low_stock,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
