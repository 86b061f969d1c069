use std::sync::Arc;

use time::{macros::format_description, Date, Duration, OffsetDateTime};
use uuid::Uuid;

use super::api::MealsApi;
use super::Alert;
use crate::meals::dto::{CreateMealRequest, UpdateMealRequest};
use crate::meals::MealItem;

/// State behind the meal list page.
pub struct MealsView<A: MealsApi + ?Sized> {
    api: Arc<A>,
    id_token: String,
    pub meals: Vec<MealItem>,
    pub new_meal_name: String,
    pub loading_meals: bool,
}

impl<A: MealsApi + ?Sized> MealsView<A> {
    pub fn new(api: Arc<A>, id_token: impl Into<String>) -> Self {
        Self {
            api,
            id_token: id_token.into(),
            meals: Vec::new(),
            new_meal_name: String::new(),
            loading_meals: true,
        }
    }

    pub async fn mount(&mut self) -> Result<(), Alert> {
        let meals = self
            .api
            .get_meals(&self.id_token)
            .await
            .map_err(|e| Alert(format!("Failed to fetch meals: {e}")))?;
        self.meals = meals;
        self.loading_meals = false;
        Ok(())
    }

    pub fn set_new_meal_name(&mut self, name: impl Into<String>) {
        self.new_meal_name = name.into();
    }

    /// Creates a meal due a week from today and appends the server's copy.
    pub async fn create(&mut self) -> Result<(), Alert> {
        let req = CreateMealRequest {
            name: self.new_meal_name.clone(),
            due_date: due_date_from(OffsetDateTime::now_utc().date()),
            recipe: None,
        };
        let meal = self
            .api
            .create_meal(&self.id_token, &req)
            .await
            .map_err(|_| Alert("Meal creation failed".into()))?;
        self.meals.push(meal);
        self.new_meal_name.clear();
        Ok(())
    }

    /// Flips `done` on the server, then locally once the server accepted it.
    pub async fn toggle_done(&mut self, pos: usize) -> Result<(), Alert> {
        let meal = self
            .meals
            .get(pos)
            .ok_or_else(|| Alert("Meal update failed".into()))?;
        let req = UpdateMealRequest {
            name: meal.name.clone(),
            due_date: meal.due_date.clone(),
            done: !meal.done,
            recipe: meal.recipe.clone(),
        };
        self.api
            .patch_meal(&self.id_token, meal.meal_id, &req)
            .await
            .map_err(|_| Alert("Meal update failed".into()))?;

        if let Some(meal) = self.meals.get_mut(pos) {
            meal.done = req.done;
        }
        Ok(())
    }

    pub async fn delete(&mut self, meal_id: Uuid) -> Result<(), Alert> {
        self.api
            .delete_meal(&self.id_token, meal_id)
            .await
            .map_err(|_| Alert("Meal deletion failed".into()))?;
        self.meals.retain(|m| m.meal_id != meal_id);
        Ok(())
    }
}

/// Route of the edit page for one meal.
pub fn edit_path(meal_id: Uuid) -> String {
    format!("/meals/{meal_id}/edit")
}

/// `yyyy-mm-dd` one week after `today`.
pub fn due_date_from(today: Date) -> String {
    let due = today.saturating_add(Duration::days(7));
    due.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| due.to_string())
}
