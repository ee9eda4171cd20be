use serde_json::Value;
use uuid::Uuid;

use crate::{error::AppResult, state::AppState};

/// Best-effort audit trail; callers log failures at `warn` and move on.
pub async fn log_audit(
    state: &AppState,
    store_id: Option<Uuid>,
    actor_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, store_id, actor_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(store_id)
    .bind(actor_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(&state.pool)
    .await?;

    Ok(())
}
