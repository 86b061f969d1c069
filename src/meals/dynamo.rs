use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{
    config::Builder as DynamoConfigBuilder, operation::update_item::builders::UpdateItemFluentBuilder,
    types::{AttributeValue, ReturnValue},
    Client,
};
use serde_dynamo::aws_sdk_dynamodb_1::{from_items, to_item};
use uuid::Uuid;

use super::repo::{MealStore, StoreError, StoreResult};
use super::repo_types::{MealItem, MealUpdate};
use crate::config::StoreConfig;

const PARTITION_KEY: &str = "userId";
const SORT_KEY: &str = "mealId";

/// Meal table in DynamoDB: hash key `userId`, range key `mealId`.
#[derive(Clone)]
pub struct DynamoMealStore {
    client: Client,
    table: String,
}

impl DynamoMealStore {
    pub fn new(shared: &SdkConfig, cfg: &StoreConfig) -> Self {
        let mut builder = DynamoConfigBuilder::from(shared);
        if let Some(endpoint) = &cfg.dynamodb_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
            table: cfg.meals_table.clone(),
        }
    }

    fn update_item(&self, user_id: &str, meal_id: Uuid) -> UpdateItemFluentBuilder {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(PARTITION_KEY, AttributeValue::S(user_id.to_string()))
            .key(SORT_KEY, AttributeValue::S(meal_id.to_string()))
            // UpdateItem would otherwise create a partial item for an unknown key.
            .condition_expression("attribute_exists(#mealId)")
            .expression_attribute_names("#mealId", SORT_KEY)
    }

    async fn send_update(&self, req: UpdateItemFluentBuilder, meal_id: Uuid) -> StoreResult<()> {
        match req.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Err(StoreError::NotFound { meal_id })
            }
            Err(err) => Err(anyhow::Error::new(err).context("dynamodb update_item").into()),
        }
    }
}

#[async_trait]
impl MealStore for DynamoMealStore {
    async fn list_by_owner(&self, user_id: &str) -> StoreResult<Vec<MealItem>> {
        let mut pages = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression(format!("{PARTITION_KEY} = :userId"))
            .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
            .into_paginator()
            .items()
            .send();

        let mut raw = Vec::new();
        while let Some(item) = pages.next().await {
            raw.push(item.context("dynamodb query")?);
        }
        let items = from_items::<MealItem>(raw).context("decode meal items")?;
        Ok(items)
    }

    async fn create(&self, item: &MealItem) -> StoreResult<()> {
        let attrs = to_item(item).context("encode meal item")?;
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(attrs))
            .send()
            .await
            .context("dynamodb put_item")?;
        Ok(())
    }

    async fn update(&self, user_id: &str, meal_id: Uuid, update: &MealUpdate) -> StoreResult<()> {
        let mut req = self
            .update_item(user_id, meal_id)
            .expression_attribute_names("#name", "name")
            .expression_attribute_names("#dueDate", "dueDate")
            .expression_attribute_names("#done", "done")
            .expression_attribute_values(":n", AttributeValue::S(update.name.clone()))
            .expression_attribute_values(":due", AttributeValue::S(update.due_date.clone()))
            .expression_attribute_values(":d", AttributeValue::Bool(update.done));

        req = match &update.recipe {
            Some(recipe) => req
                .update_expression("SET #name = :n, #dueDate = :due, #done = :d, #recipe = :r")
                .expression_attribute_names("#recipe", "recipe")
                .expression_attribute_values(":r", AttributeValue::S(recipe.clone())),
            None => req.update_expression("SET #name = :n, #dueDate = :due, #done = :d"),
        };

        self.send_update(req, meal_id).await
    }

    async fn delete(&self, user_id: &str, meal_id: Uuid) -> StoreResult<bool> {
        let out = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key(PARTITION_KEY, AttributeValue::S(user_id.to_string()))
            .key(SORT_KEY, AttributeValue::S(meal_id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .context("dynamodb delete_item")?;
        Ok(out.attributes().is_some_and(|old| !old.is_empty()))
    }

    async fn set_attachment_url(
        &self,
        user_id: &str,
        meal_id: Uuid,
        url: &str,
    ) -> StoreResult<()> {
        let req = self
            .update_item(user_id, meal_id)
            .update_expression("SET attachmentUrl = :attachmentUrl")
            .expression_attribute_values(":attachmentUrl", AttributeValue::S(url.to_string()));
        self.send_update(req, meal_id).await
    }
}
