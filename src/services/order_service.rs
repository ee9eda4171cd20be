use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        CreateOrderRequest, OrderList, UpdateOrderQuantityRequest, UpdateOrderStatusRequest,
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::tenant::TenantContext,
    models::{Order, OrderStatus, Timeline},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{customer_service, inventory_service},
    state::AppState,
};

/// Create an order from an inbound request.
///
/// The customer is resolved (matched or created) first and that write commits
/// on its own: a later validation failure on the order leaves the merge in
/// place. The order insert and the stock decrement share one transaction with
/// the product row locked, so concurrent creations serialize their deltas.
pub async fn create_order(
    state: &AppState,
    ctx: &TenantContext,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".into()));
    }

    let customer =
        customer_service::resolve_customer(&state.orm, ctx.store_id, &payload.customer).await?;

    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(payload.product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    if product.store_id != ctx.store_id {
        return Err(AppError::Validation(
            "product does not belong to this store".into(),
        ));
    }

    let total = product.price * payload.quantity as i64;
    let mut timeline = Timeline::default();
    timeline.record("Order created", customer.name.clone());

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(ctx.store_id),
        customer_id: Set(Some(customer.id)),
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        customer_name: Set(customer.name.clone()),
        customer_email: Set(customer.email.clone()),
        customer_phone: Set(customer.phone.clone()),
        shipping_address: Set(payload.shipping_address.or_else(|| customer.address.clone())),
        notes: Set(payload.notes),
        quantity: Set(payload.quantity),
        unit_price: Set(product.price),
        total: Set(total),
        status: Set(OrderStatus::Pending),
        is_paid: Set(false),
        payment_status: Set(OrderStatus::Pending.payment_status().to_string()),
        timeline: Set(timeline),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    inventory_service::apply_delta(&txn, product, -payload.quantity, state.clamp_stock_at_zero)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "customer_id": customer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = find_scoped_for_update(&txn, ctx, id).await?;

    let current = order.status;
    let next = payload.status;
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: current.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }

    let actor = payload.actor.unwrap_or_else(|| ctx.actor_label());
    let mut timeline = order.timeline.clone();
    timeline.record(
        format!("Status changed from {} to {}", current.as_str(), next.as_str()),
        actor,
    );

    let mut active: OrderActive = order.into();
    active.status = Set(next);
    active.is_paid = Set(next.implies_paid());
    active.payment_status = Set(next.payment_status().to_string());
    active.timeline = Set(timeline);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": next.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Quantity edits recompute the total from the stored unit price. Inventory
/// is deliberately untouched: stock moves only at order creation and return
/// approval.
pub async fn update_order_quantity(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    payload: UpdateOrderQuantityRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".into()));
    }

    let txn = state.orm.begin().await?;

    let order = find_scoped_for_update(&txn, ctx, id).await?;

    let previous = order.quantity;
    let total = order.unit_price * payload.quantity as i64;
    let mut timeline = order.timeline.clone();
    timeline.record(
        format!("Quantity changed from {} to {}", previous, payload.quantity),
        ctx.actor_label(),
    );

    let mut active: OrderActive = order.into();
    active.quantity = Set(payload.quantity);
    active.total = Set(total);
    active.timeline = Set(timeline);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "order_quantity_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    ctx: &TenantContext,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(OrderCol::StoreId.eq(ctx.store_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    match order {
        Some(o) if o.store_id == ctx.store_id => Ok(ApiResponse::success(
            "Order",
            order_from_entity(o),
            None,
        )),
        _ => Err(AppError::NotFound),
    }
}

async fn find_scoped_for_update(
    txn: &sea_orm::DatabaseTransaction,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<OrderModel> {
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?;
    match order {
        Some(o) if o.store_id == ctx.store_id => Ok(o),
        _ => Err(AppError::NotFound),
    }
}

pub fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        store_id: model.store_id,
        customer_id: model.customer_id,
        product_id: model.product_id,
        product_name: model.product_name,
        customer_name: model.customer_name,
        customer_email: model.customer_email,
        customer_phone: model.customer_phone,
        shipping_address: model.shipping_address,
        notes: model.notes,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total: model.total,
        status: model.status,
        is_paid: model.is_paid,
        payment_status: model.payment_status,
        timeline: model.timeline,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
