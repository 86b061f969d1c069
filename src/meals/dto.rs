use serde::{Deserialize, Serialize};

use super::repo_types::{MealItem, MealUpdate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: String,
    pub due_date: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>, // absent leaves the stored recipe as is
}

impl From<UpdateMealRequest> for MealUpdate {
    fn from(r: UpdateMealRequest) -> Self {
        Self {
            name: r.name,
            due_date: r.due_date,
            done: r.done,
            recipe: r.recipe,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMealsResponse {
    pub items: Vec<MealItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedMealResponse {
    pub item: MealItem,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
}
