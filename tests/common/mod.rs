#![allow(dead_code)]

use backoffice_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::customers::CustomerContact,
    entity::{products::ActiveModel as ProductActive, stores::ActiveModel as StoreActive},
    middleware::tenant::TenantContext,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// Integration tests skip when neither variable is set.
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE returns, orders, customers, products, audit_logs, stores RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        clamp_stock_at_zero: false,
    })
}

// Deterministic factories; test-only, never part of the served binary.

pub async fn seed_store(state: &AppState) -> anyhow::Result<Uuid> {
    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        name: Set("Demo Store".into()),
        currency: Set("USD".into()),
        is_demo: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(store.id)
}

pub async fn seed_product(
    state: &AppState,
    store_id: Uuid,
    price: i64,
    stock_quantity: i32,
    reorder_threshold: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        name: Set("Test Widget".into()),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        stock_quantity: Set(stock_quantity),
        reorder_threshold: Set(reorder_threshold),
        low_stock: Set(stock_quantity <= reorder_threshold),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

pub fn staff(store_id: Uuid) -> TenantContext {
    TenantContext {
        store_id,
        actor_id: None,
        role: "staff".into(),
    }
}

pub fn admin(store_id: Uuid) -> TenantContext {
    TenantContext {
        store_id,
        actor_id: Some(Uuid::new_v4()),
        role: "admin".into(),
    }
}

pub fn contact(
    name: &str,
    email: &str,
    phone: Option<&str>,
    address: Option<&str>,
) -> CustomerContact {
    CustomerContact {
        name: name.into(),
        email: email.into(),
        phone: phone.map(Into::into),
        address: address.map(Into::into),
    }
}
