use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo::{MealStore, StoreError, StoreResult};
use super::repo_types::{MealItem, MealUpdate};

/// Meal table in Postgres, primary key `(user_id, meal_id)`.
#[derive(Clone)]
pub struct PgMealStore {
    db: PgPool,
}

impl PgMealStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealStore for PgMealStore {
    async fn list_by_owner(&self, user_id: &str) -> StoreResult<Vec<MealItem>> {
        let rows = sqlx::query_as::<_, MealItem>(
            r#"
            SELECT user_id, meal_id, created_at, name, due_date, recipe, done, attachment_url
              FROM meals
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list meals by owner")?;
        Ok(rows)
    }

    async fn create(&self, item: &MealItem) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO meals (user_id, meal_id, created_at, name, due_date, recipe, done, attachment_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, meal_id) DO UPDATE
               SET created_at = EXCLUDED.created_at,
                   name = EXCLUDED.name,
                   due_date = EXCLUDED.due_date,
                   recipe = EXCLUDED.recipe,
                   done = EXCLUDED.done,
                   attachment_url = EXCLUDED.attachment_url
            "#,
        )
        .bind(&item.user_id)
        .bind(item.meal_id)
        .bind(item.created_at)
        .bind(&item.name)
        .bind(&item.due_date)
        .bind(&item.recipe)
        .bind(item.done)
        .bind(&item.attachment_url)
        .execute(&self.db)
        .await
        .context("insert meal")?;
        Ok(())
    }

    async fn update(&self, user_id: &str, meal_id: Uuid, update: &MealUpdate) -> StoreResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE meals
               SET name = $3, due_date = $4, done = $5, recipe = COALESCE($6, recipe)
             WHERE user_id = $1 AND meal_id = $2
            "#,
        )
        .bind(user_id)
        .bind(meal_id)
        .bind(&update.name)
        .bind(&update.due_date)
        .bind(update.done)
        .bind(&update.recipe)
        .execute(&self.db)
        .await
        .context("update meal")?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound { meal_id });
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, meal_id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM meals WHERE user_id = $1 AND meal_id = $2")
            .bind(user_id)
            .bind(meal_id)
            .execute(&self.db)
            .await
            .context("delete meal")?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_attachment_url(
        &self,
        user_id: &str,
        meal_id: Uuid,
        url: &str,
    ) -> StoreResult<()> {
        let res = sqlx::query(
            "UPDATE meals SET attachment_url = $3 WHERE user_id = $1 AND meal_id = $2",
        )
        .bind(user_id)
        .bind(meal_id)
        .bind(url)
        .execute(&self.db)
        .await
        .context("set meal attachment url")?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound { meal_id });
        }
        Ok(())
    }
}
