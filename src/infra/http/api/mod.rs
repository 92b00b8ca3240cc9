pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/floor",
            get(handlers::list_floors).post(handlers::create_floor),
        )
        .route(
            "/api/floor/{id}",
            get(handlers::get_floor)
                .put(handlers::update_floor)
                .delete(handlers::delete_floor),
        )
}
