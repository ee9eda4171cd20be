use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{InventoryAdjustRequest, ProductList},
    entity::products::{
        ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
        Model as ProductModel,
    },
    error::{AppError, AppResult},
    middleware::tenant::{ensure_admin, TenantContext},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::LowStockQuery,
    services::product_service::product_from_entity,
    state::AppState,
};

/// `stock_quantity <= reorder_threshold`; a soft signal, never a hard limit.
pub fn is_low_stock(stock_quantity: i32, reorder_threshold: i32) -> bool {
    stock_quantity <= reorder_threshold
}

/// Apply a signed stock delta to an already-locked product row.
///
/// The caller holds the row lock (`SELECT ... FOR UPDATE`) within its
/// transaction, so concurrent deltas against the same product serialize.
/// Negative stock is permitted unless `clamp_at_zero` is set, in which case
/// a result below zero fails the request. `low_stock` is recomputed on every
/// delta.
pub async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    product: ProductModel,
    delta: i32,
    clamp_at_zero: bool,
) -> AppResult<ProductModel> {
    let new_stock = product.stock_quantity + delta;
    if clamp_at_zero && new_stock < 0 {
        return Err(AppError::Validation(format!(
            "insufficient stock for product {}",
            product.id
        )));
    }

    let reorder_threshold = product.reorder_threshold;
    let mut active: ProductActive = product.into();
    active.stock_quantity = Set(new_stock);
    active.low_stock = Set(is_low_stock(new_stock, reorder_threshold));
    let updated = active.update(conn).await?;
    Ok(updated)
}

/// Lock a product row for a stock mutation within `conn`'s transaction.
pub async fn lock_product<C: ConnectionTrait>(
    conn: &C,
    store_id: Uuid,
    product_id: Uuid,
) -> AppResult<ProductModel> {
    let product = Products::find_by_id(product_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    match product {
        Some(p) if p.store_id == store_id => Ok(p),
        _ => Err(AppError::NotFound),
    }
}

/// Manual stock correction from the admin surface.
pub async fn adjust_inventory(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(ctx)?;
    if payload.delta == 0 {
        return Err(AppError::Validation("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = lock_product(&txn, ctx.store_id, id).await?;
    let updated = apply_delta(&txn, product, payload.delta, state.clamp_stock_at_zero).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "inventory_adjust",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id, "delta": payload.delta })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Inventory updated",
        product_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    ctx: &TenantContext,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let condition = Condition::all()
        .add(ProductCol::StoreId.eq(ctx.store_id))
        .add(ProductCol::LowStock.eq(true));

    let finder = Products::find()
        .filter(condition)
        .order_by_asc(ProductCol::StockQuantity)
        .order_by_desc(ProductCol::CreatedAt);

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
        "Low stock",
        ProductList { items },
        Some(meta),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_boundary_is_inclusive() {
        assert!(is_low_stock(10, 10));
        assert!(is_low_stock(9, 10));
        assert!(!is_low_stock(11, 10));
    }

    #[test]
    fn negative_stock_still_reads_as_low() {
        assert!(is_low_stock(-3, 0));
    }
}
