use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::customers::{CreateCustomerRequest, CustomerContact, CustomerList, UpdateCustomerRequest},
    entity::{
        customers::{ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers, Model as CustomerModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::tenant::TenantContext,
    models::{Alternates, Customer},
    normalize::{normalize_address, normalize_email, normalize_name, normalize_phone},
    response::{ApiResponse, Meta},
    routes::params::CustomerQuery,
    state::AppState,
};

/// Merge an incoming contact bundle into a stored customer record.
///
/// Primary name and email are never overwritten; values that differ under
/// their canonical form land in the alternate sequences, deduplicated. An
/// absent primary phone/address is filled in rather than shadowed. Returns
/// true when anything changed.
pub fn merge_contact(customer: &mut CustomerModel, contact: &CustomerContact) -> bool {
    let mut changed = false;

    if normalize_name(Some(&contact.name)) != normalize_name(Some(&customer.name)) {
        changed |= customer
            .alternative_names
            .push_unique(&contact.name, normalize_name);
    }

    // Matching is single-keyed on the primary email; alternate emails are
    // informational and not consulted here.

    if let Some(phone) = contact
        .phone
        .as_deref()
        .filter(|p| !normalize_phone(Some(p)).is_empty())
    {
        match customer
            .phone
            .as_deref()
            .filter(|p| !normalize_phone(Some(p)).is_empty())
        {
            None => {
                customer.phone = Some(phone.trim().to_string());
                changed = true;
            }
            Some(primary) => {
                if normalize_phone(Some(primary)) != normalize_phone(Some(phone)) {
                    changed |= customer.alternative_phones.push_unique(phone, normalize_phone);
                }
            }
        }
    }

    if let Some(address) = contact
        .address
        .as_deref()
        .filter(|a| !normalize_address(Some(a)).is_empty())
    {
        match customer
            .address
            .as_deref()
            .filter(|a| !normalize_address(Some(a)).is_empty())
        {
            None => {
                customer.address = Some(address.trim().to_string());
                changed = true;
            }
            Some(primary) => {
                if normalize_address(Some(primary)) != normalize_address(Some(address)) {
                    changed |= customer
                        .alternative_addresses
                        .push_unique(address, normalize_address);
                }
            }
        }
    }

    changed
}

/// Find the store's customer for an incoming contact bundle, or create one.
///
/// Matching is by normalized primary email within the store. When two
/// concurrent calls race to create the same customer, the loser hits the
/// `(store_id, email_normalized)` uniqueness constraint and retries the
/// lookup-then-merge path instead of surfacing the error. The write commits
/// with `conn`; callers that must not roll it back with a later failure pass
/// a plain connection rather than their transaction.
pub async fn resolve_customer<C: ConnectionTrait>(
    conn: &C,
    store_id: Uuid,
    contact: &CustomerContact,
) -> AppResult<CustomerModel> {
    let email_norm = normalize_email(Some(&contact.email));

    if !email_norm.is_empty() {
        if let Some(existing) = find_by_email_norm(conn, store_id, &email_norm).await? {
            return merge_and_save(conn, existing, contact).await;
        }
    }

    match new_customer(store_id, contact, &email_norm).insert(conn).await {
        Ok(created) => Ok(created),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // Lost the creation race; the winner's row exists now.
            let existing = find_by_email_norm(conn, store_id, &email_norm)
                .await?
                .ok_or(AppError::NotFound)?;
            merge_and_save(conn, existing, contact).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn find_by_email_norm<C: ConnectionTrait>(
    conn: &C,
    store_id: Uuid,
    email_norm: &str,
) -> AppResult<Option<CustomerModel>> {
    let found = Customers::find()
        .filter(
            Condition::all()
                .add(CustomerCol::StoreId.eq(store_id))
                .add(CustomerCol::EmailNormalized.eq(email_norm)),
        )
        .one(conn)
        .await?;
    Ok(found)
}

fn new_customer(store_id: Uuid, contact: &CustomerContact, email_norm: &str) -> CustomerActive {
    CustomerActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        name: Set(contact.name.trim().to_string()),
        email: Set(contact.email.trim().to_string()),
        email_normalized: Set(email_norm.to_string()),
        phone: Set(contact.phone.as_deref().map(|p| p.trim().to_string())),
        address: Set(contact.address.as_deref().map(|a| a.trim().to_string())),
        alternative_names: Set(Alternates::default()),
        alternative_emails: Set(Alternates::default()),
        alternative_phones: Set(Alternates::default()),
        alternative_addresses: Set(Alternates::default()),
        created_at: NotSet,
        updated_at: NotSet,
    }
}

async fn merge_and_save<C: ConnectionTrait>(
    conn: &C,
    mut customer: CustomerModel,
    contact: &CustomerContact,
) -> AppResult<CustomerModel> {
    if !merge_contact(&mut customer, contact) {
        return Ok(customer);
    }

    let mut active: CustomerActive = customer.clone().into();
    active.phone = Set(customer.phone.clone());
    active.address = Set(customer.address.clone());
    active.alternative_names = Set(customer.alternative_names.clone());
    active.alternative_phones = Set(customer.alternative_phones.clone());
    active.alternative_addresses = Set(customer.alternative_addresses.clone());
    active.updated_at = Set(Utc::now().into());
    let saved = active.update(conn).await?;
    Ok(saved)
}

pub async fn list_customers(
    state: &AppState,
    ctx: &TenantContext,
    query: CustomerQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(CustomerCol::StoreId.eq(ctx.store_id));
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(CustomerCol::Name).ilike(pattern.clone()))
                .add(Expr::col(CustomerCol::Email).ilike(pattern)),
        );
    }

    let finder = Customers::find()
        .filter(condition)
        .order_by_desc(CustomerCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(meta),
    ))
}

pub async fn get_customer(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    let customer = find_scoped(state, ctx, id).await?;
    Ok(ApiResponse::success(
        "Customer",
        customer_from_entity(customer),
        None,
    ))
}

pub async fn create_customer(
    state: &AppState,
    ctx: &TenantContext,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let contact = CustomerContact {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
    };
    let email_norm = normalize_email(Some(&contact.email));
    if email_norm.is_empty() {
        return Err(AppError::Validation("email must not be empty".into()));
    }
    if find_by_email_norm(&state.orm, ctx.store_id, &email_norm)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(
            "customer with this email already exists".into(),
        ));
    }

    let created = match new_customer(ctx.store_id, &contact, &email_norm)
        .insert(&state.orm)
        .await
    {
        Ok(model) => model,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Validation(
                "customer with this email already exists".into(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "customer_create",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": created.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Customer created",
        customer_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_customer(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let existing = find_scoped(state, ctx, id).await?;

    let mut alternative_phones = existing.alternative_phones.clone();
    let mut alternative_addresses = existing.alternative_addresses.clone();

    let mut active: CustomerActive = existing.clone().into();
    if let Some(phone) = payload.phone {
        if let Some(previous) = existing.phone.as_deref() {
            if normalize_phone(Some(previous)) != normalize_phone(Some(&phone)) {
                alternative_phones.push_unique(previous, normalize_phone);
            }
        }
        active.phone = Set(Some(phone));
        active.alternative_phones = Set(alternative_phones);
    }
    if let Some(address) = payload.address {
        if let Some(previous) = existing.address.as_deref() {
            if normalize_address(Some(previous)) != normalize_address(Some(&address)) {
                alternative_addresses.push_unique(previous, normalize_address);
            }
        }
        active.address = Set(Some(address));
        active.alternative_addresses = Set(alternative_addresses);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "customer_update",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Customer updated",
        customer_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Deletion is blocked while any order references the customer; the only
/// removal path for referenced customers is store-cascade delete, which this
/// service does not expose.
pub async fn delete_customer(
    state: &AppState,
    ctx: &TenantContext,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_scoped(state, ctx, id).await?;

    let referencing = Orders::find()
        .filter(OrderCol::CustomerId.eq(existing.id))
        .count(&state.orm)
        .await?;
    if referencing > 0 {
        return Err(AppError::Validation(
            "customer has orders and cannot be deleted".into(),
        ));
    }

    Customers::delete_by_id(existing.id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(ctx.store_id),
        ctx.actor_id,
        "customer_delete",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Customer deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_scoped(state: &AppState, ctx: &TenantContext, id: Uuid) -> AppResult<CustomerModel> {
    let customer = Customers::find_by_id(id).one(&state.orm).await?;
    match customer {
        Some(c) if c.store_id == ctx.store_id => Ok(c),
        _ => Err(AppError::NotFound),
    }
}

pub fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        store_id: model.store_id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        alternative_names: model.alternative_names,
        alternative_emails: model.alternative_emails,
        alternative_phones: model.alternative_phones,
        alternative_addresses: model.alternative_addresses,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}
