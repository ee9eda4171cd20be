use axum::Router;

use crate::state::AppState;

pub mod customers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod returns;
pub mod stores;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/stores", stores::router())
        .nest("/customers", customers::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/returns", returns::router())
}
