use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    /// Oversell policy from config, threaded to the inventory ledger.
    pub clamp_stock_at_zero: bool,
}
