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
    dto::returns::{CreateReturnRequest, ReturnList, UpdateReturnStatusRequest},
    entity::{
        orders::Entity as Orders,
        returns::{ActiveModel as ReturnActive, Column as ReturnCol, Entity as Returns, Model as ReturnModel},
    },
    error::{AppError, AppResult},
    middleware::tenant::TenantContext,
    models::{Return, ReturnHistory, ReturnStatus},
    response::{ApiResponse, Meta},
    routes::params::ReturnListQuery,
    services::inventory_service,
    state::AppState,
};

pub async fn create_return(
    state: &AppState,
    ctx: &TenantContext,
    payload: CreateReturnRequest,
) -> AppResult<ApiResponse<Return>> {
    if payload.returned_quantity < 1 {
        return Err(AppError::Validation(
            "returned quantity must be at least 1".into(),
        ));
    }

    let order = Orders::find_by_id(payload.order_id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    if order.store_id != ctx.store_id {
        return Err(AppError::Validation(
            "order does not belong to this store".into(),
        ));
    }
    if payload.returned_quantity > order.quantity {
        return Err(AppError::Validation(format!(
            "returned quantity {} exceeds order quantity {}",
            payload.returned_quantity, order.quantity
        )));
    }

    let refund_amount = order.unit_price * payload.returned_quantity as i64;
    let mut history = ReturnHistory::default();
    history.record(
        ReturnStatus::Submitted,
        "Customer",
        Some("Return request submitted".to_string()),
    );

    let created = ReturnActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(ctx.store_id),
        order_id: Set(order.id),
        customer_id: Set(order.customer_id),
        product_id: Set(order.product_id),
        reason: Set(payload.reason),
        returned_quantity: Set(payload.returned_quantity),
        refund_amount: Set(refund_amount),
        status: Set(ReturnStatus::Submitted),
        history: Set(history),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "return_create",
        Some("returns"),
        Some(serde_json::json!({ "return_id": created.id, "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Return created",
        return_from_entity(created),
        Some(Meta::empty()),
    ))
}

/// Apply a return status transition.
///
/// The return row is locked for the whole read-check-write, so the
/// "first entry into Approved/Refunded" check is atomic with the status
/// write: two concurrent updates cannot both observe the pre-transition
/// status and double-credit stock.
pub async fn update_return_status(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    payload: UpdateReturnStatusRequest,
) -> AppResult<ApiResponse<Return>> {
    let txn = state.orm.begin().await?;

    let record = Returns::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let record = match record {
        Some(r) if r.store_id == ctx.store_id => r,
        _ => return Err(AppError::NotFound),
    };

    let current = record.status;
    let next = payload.status;
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: current.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }

    // Credit stock back exactly once, on the first transition into a
    // restocking status; re-entering one later must not credit again.
    if next.restocks() && !current.restocks() {
        let product = inventory_service::lock_product(&txn, ctx.store_id, record.product_id).await?;
        inventory_service::apply_delta(
            &txn,
            product,
            record.returned_quantity,
            state.clamp_stock_at_zero,
        )
        .await?;
    }

    let actor = payload.actor.unwrap_or_else(|| ctx.actor_label());
    let mut history = record.history.clone();
    history.record(next, actor, payload.note.clone());

    let mut active: ReturnActive = record.into();
    active.status = Set(next);
    active.history = Set(history);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "return_status_update",
        Some("returns"),
        Some(serde_json::json!({ "return_id": updated.id, "status": next.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Return updated",
        return_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_returns(
    state: &AppState,
    ctx: &TenantContext,
    query: ReturnListQuery,
) -> AppResult<ApiResponse<ReturnList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(ReturnCol::StoreId.eq(ctx.store_id));
    if let Some(status) = query.status {
        condition = condition.add(ReturnCol::Status.eq(status));
    }
    if let Some(order_id) = query.order_id {
        condition = condition.add(ReturnCol::OrderId.eq(order_id));
    }

    let finder = Returns::find()
        .filter(condition)
        .order_by_desc(ReturnCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(return_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Returns",
        ReturnList { items },
        Some(meta),
    ))
}

pub async fn get_return(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Return>> {
    let record = Returns::find_by_id(id).one(&state.orm).await?;
    match record {
        Some(r) if r.store_id == ctx.store_id => Ok(ApiResponse::success(
            "Return",
            return_from_entity(r),
            None,
        )),
        _ => Err(AppError::NotFound),
    }
}

pub fn return_from_entity(model: ReturnModel) -> Return {
    Return {
        id: model.id,
        store_id: model.store_id,
        order_id: model.order_id,
        customer_id: model.customer_id,
        product_id: model.product_id,
        reason: model.reason,
        returned_quantity: model.returned_quantity,
        refund_amount: model.refund_amount,
        status: model.status,
        history: model.history,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
