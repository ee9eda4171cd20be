use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// The acting store plus actor identity for a request.
///
/// An upstream gateway authenticates the caller and injects `x-store-id`,
/// `x-actor-id` and `x-actor-role`; this service trusts those headers and
/// performs no authentication of its own. Every store-scoped operation takes
/// this context and filters by `store_id`.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub store_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub role: String,
}

impl TenantContext {
    /// Label recorded on timeline/history entries when the caller does not
    /// name an actor explicitly.
    pub fn actor_label(&self) -> String {
        self.actor_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.role.clone())
    }
}

/// Actor identity without a store scope, for the store-management endpoints.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: Option<Uuid>,
    pub role: String,
}

pub fn ensure_role(role: &str, required: &str) -> Result<(), AppError> {
    if role != required {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(ctx: &TenantContext) -> Result<(), AppError> {
    ensure_role(&ctx.role, "admin")
}

pub fn ensure_admin_actor(ctx: &ActorContext) -> Result<(), AppError> {
    ensure_role(&ctx.role, "admin")
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

fn actor_fields(parts: &Parts) -> Result<(Option<Uuid>, String), AppError> {
    let actor_id = match header_str(parts, "x-actor-id") {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest("Invalid x-actor-id header".into()))?,
        ),
        None => None,
    };
    let role = header_str(parts, "x-actor-role")
        .unwrap_or("staff")
        .to_string();
    Ok((actor_id, role))
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = header_str(parts, "x-store-id")
            .ok_or_else(|| AppError::BadRequest("Missing x-store-id header".into()))?;
        let store_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::BadRequest("Invalid x-store-id header".into()))?;

        let (actor_id, role) = actor_fields(parts)?;

        Ok(TenantContext {
            store_id,
            actor_id,
            role,
        })
    }
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (actor_id, role) = actor_fields(parts)?;
        Ok(ActorContext { actor_id, role })
    }
}
