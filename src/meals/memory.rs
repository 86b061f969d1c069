use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{MealStore, StoreError, StoreResult};
use super::repo_types::{MealItem, MealUpdate};

/// Process-local meal table. Items of one owner keep insertion order.
#[derive(Default)]
pub struct InMemoryMealStore {
    partitions: RwLock<HashMap<String, Vec<MealItem>>>,
}

impl InMemoryMealStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MealStore for InMemoryMealStore {
    async fn list_by_owner(&self, user_id: &str) -> StoreResult<Vec<MealItem>> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(user_id).cloned().unwrap_or_default())
    }

    async fn create(&self, item: &MealItem) -> StoreResult<()> {
        let mut partitions = self.partitions.write().await;
        let items = partitions.entry(item.user_id.clone()).or_default();
        match items.iter_mut().find(|m| m.meal_id == item.meal_id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(())
    }

    async fn update(&self, user_id: &str, meal_id: Uuid, update: &MealUpdate) -> StoreResult<()> {
        let mut partitions = self.partitions.write().await;
        let item = partitions
            .get_mut(user_id)
            .and_then(|items| items.iter_mut().find(|m| m.meal_id == meal_id))
            .ok_or(StoreError::NotFound { meal_id })?;
        item.apply(update.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str, meal_id: Uuid) -> StoreResult<bool> {
        let mut partitions = self.partitions.write().await;
        let Some(items) = partitions.get_mut(user_id) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|m| m.meal_id != meal_id);
        Ok(items.len() < before)
    }

    async fn set_attachment_url(
        &self,
        user_id: &str,
        meal_id: Uuid,
        url: &str,
    ) -> StoreResult<()> {
        let mut partitions = self.partitions.write().await;
        let item = partitions
            .get_mut(user_id)
            .and_then(|items| items.iter_mut().find(|m| m.meal_id == meal_id))
            .ok_or(StoreError::NotFound { meal_id })?;
        item.attachment_url = Some(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn meal(user_id: &str, name: &str) -> MealItem {
        MealItem {
            user_id: user_id.into(),
            meal_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            name: name.into(),
            due_date: "2024-01-10".into(),
            recipe: None,
            done: false,
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let store = InMemoryMealStore::new();
        let a = meal("a", "Oatmeal");
        let b = meal("b", "Pancakes");
        store.create(&a).await.unwrap();
        store.create(&b).await.unwrap();

        let listed = store.list_by_owner("a").await.unwrap();
        assert_eq!(listed, vec![a]);
        assert!(store.list_by_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_overwrites_same_key() {
        let store = InMemoryMealStore::new();
        let mut item = meal("a", "Oatmeal");
        store.create(&item).await.unwrap();
        item.name = "Porridge".into();
        store.create(&item).await.unwrap();

        let listed = store.list_by_owner("a").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Porridge");
    }

    #[tokio::test]
    async fn update_missing_item_is_not_found() {
        let store = InMemoryMealStore::new();
        let update = MealUpdate {
            name: "x".into(),
            due_date: "2024-01-01".into(),
            done: true,
            recipe: None,
        };
        let err = store.update("a", Uuid::new_v4(), &update).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_cannot_reach_other_owners_item() {
        let store = InMemoryMealStore::new();
        let item = meal("a", "Oatmeal");
        store.create(&item).await.unwrap();
        let update = MealUpdate {
            name: "stolen".into(),
            due_date: "2024-01-01".into(),
            done: true,
            recipe: None,
        };
        let err = store.update("b", item.meal_id, &update).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.list_by_owner("a").await.unwrap()[0].name, "Oatmeal");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryMealStore::new();
        let item = meal("a", "Oatmeal");
        store.create(&item).await.unwrap();
        assert!(store.delete("a", item.meal_id).await.unwrap());
        assert!(!store.delete("a", item.meal_id).await.unwrap());
        assert!(store.list_by_owner("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_attachment_url_touches_only_that_field() {
        let store = InMemoryMealStore::new();
        let item = meal("a", "Oatmeal");
        store.create(&item).await.unwrap();
        store
            .set_attachment_url("a", item.meal_id, "https://img/x")
            .await
            .unwrap();

        let stored = &store.list_by_owner("a").await.unwrap()[0];
        assert_eq!(stored.attachment_url.as_deref(), Some("https://img/x"));
        assert_eq!(stored.name, item.name);
        assert_eq!(stored.created_at, item.created_at);
    }
}
