use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::stores::{CreateStoreRequest, StoreList},
    entity::stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores, Model as StoreModel},
    error::{AppError, AppResult},
    middleware::tenant::{ensure_admin_actor, ActorContext},
    models::Store,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn create_store(
    state: &AppState,
    ctx: &ActorContext,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin_actor(ctx)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("store name must not be empty".into()));
    }

    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        currency: Set(payload.currency.unwrap_or_else(|| "USD".to_string())),
        is_demo: Set(payload.is_demo.unwrap_or(false)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(store.id),
        ctx.actor_id,
        "store_create",
        Some("stores"),
        Some(serde_json::json!({ "store_id": store.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Store created",
        store_from_entity(store),
        Some(Meta::empty()),
    ))
}

pub async fn list_stores(
    state: &AppState,
    ctx: &ActorContext,
    pagination: Pagination,
) -> AppResult<ApiResponse<StoreList>> {
    ensure_admin_actor(ctx)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Stores::find().order_by_desc(StoreCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(store_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Stores", StoreList { items }, Some(meta)))
}

pub async fn get_store(
    state: &AppState,
    ctx: &ActorContext,
    id: Uuid,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin_actor(ctx)?;
    let store = Stores::find_by_id(id).one(&state.orm).await?;
    let store = match store {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Store", store_from_entity(store), None))
}

pub fn store_from_entity(model: StoreModel) -> Store {
    Store {
        id: model.id,
        name: model.name,
        currency: model.currency,
        is_demo: model.is_demo,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
