use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{MealItem, MealUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("meal {meal_id} not found")]
    NotFound { meal_id: Uuid },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Point operations against the meal table. Every call addresses one owner
/// partition and at most one item in it.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// All items of `user_id`, in whatever order the store returns them.
    async fn list_by_owner(&self, user_id: &str) -> StoreResult<Vec<MealItem>>;

    /// Insert or overwrite by (`user_id`, `meal_id`).
    async fn create(&self, item: &MealItem) -> StoreResult<()>;

    /// Overwrite name, due date and done, and the recipe when one is given.
    /// Fails with `NotFound` for a missing key.
    async fn update(&self, user_id: &str, meal_id: Uuid, update: &MealUpdate) -> StoreResult<()>;

    /// Idempotent delete. Returns whether a record was removed.
    async fn delete(&self, user_id: &str, meal_id: Uuid) -> StoreResult<bool>;

    /// Overwrite `attachment_url` only. Fails with `NotFound` for a missing key.
    async fn set_attachment_url(&self, user_id: &str, meal_id: Uuid, url: &str)
        -> StoreResult<()>;
}
