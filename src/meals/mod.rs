pub mod dto;
pub mod dynamo;
pub mod handlers;
pub mod memory;
pub mod postgres;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dynamo::DynamoMealStore;
pub use memory::InMemoryMealStore;
pub use postgres::PgMealStore;
pub use repo::{MealStore, StoreError, StoreResult};
pub use repo_types::{MealItem, MealUpdate};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
