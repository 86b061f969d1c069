use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A meal reminder, keyed by (`user_id`, `meal_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealItem {
    pub user_id: String,                // partition key, the owner's token subject
    pub meal_id: Uuid,                  // sort key
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub name: String,
    pub due_date: String,               // ISO date, not parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

/// The mutable subset of a meal. `recipe: None` keeps the stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealUpdate {
    pub name: String,
    pub due_date: String,
    pub done: bool,
    #[serde(default)]
    pub recipe: Option<String>,
}

impl MealItem {
    pub(crate) fn apply(&mut self, update: MealUpdate) {
        self.name = update.name;
        self.due_date = update.due_date;
        self.done = update.done;
        if update.recipe.is_some() {
            self.recipe = update.recipe;
        }
    }
}
