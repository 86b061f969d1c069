use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dto::CreateMealRequest;
use super::repo::StoreResult;
use super::repo_types::{MealItem, MealUpdate};
use crate::state::AppState;
use crate::storage::public_object_url;

pub async fn list_items(st: &AppState, user_id: &str) -> StoreResult<Vec<MealItem>> {
    info!(%user_id, "listing meals");
    st.meals.list_by_owner(user_id).await
}

/// Persists a new meal and returns it exactly as stored.
pub async fn create_item(
    st: &AppState,
    user_id: &str,
    req: CreateMealRequest,
) -> StoreResult<MealItem> {
    let item = MealItem {
        user_id: user_id.to_string(),
        meal_id: Uuid::new_v4(),
        created_at: now_millis(),
        name: req.name,
        due_date: req.due_date,
        recipe: req.recipe,
        done: false,
        attachment_url: None,
    };
    info!(%user_id, meal_id = %item.meal_id, "creating meal");

    st.meals.create(&item).await?;
    Ok(item)
}

pub async fn update_item(
    st: &AppState,
    user_id: &str,
    meal_id: Uuid,
    update: MealUpdate,
) -> StoreResult<()> {
    info!(%user_id, %meal_id, done = update.done, "updating meal");
    st.meals.update(user_id, meal_id, &update).await
}

/// Signs an upload URL keyed by the meal id and records where the object will
/// live. The attachment URL is written before the client has uploaded anything.
pub async fn generate_upload_url(st: &AppState, user_id: &str, meal_id: Uuid) -> StoreResult<String> {
    info!(%user_id, %meal_id, "generating upload url");

    let key = meal_id.to_string();
    let signed = st
        .storage
        .presign_put(&key, st.config.s3.signed_url_expiration_secs)
        .await?;

    st.meals
        .set_attachment_url(user_id, meal_id, public_object_url(&signed))
        .await?;
    Ok(signed)
}

/// Removes the record, then its attachment. The blob is only touched when this
/// owner's record was actually removed. A blob failure after the record is gone
/// leaves an orphaned blob, logged with its key.
pub async fn delete_item(st: &AppState, user_id: &str, meal_id: Uuid) -> StoreResult<()> {
    info!(%user_id, %meal_id, "deleting meal");
    if !st.meals.delete(user_id, meal_id).await? {
        debug!(%user_id, %meal_id, "no such meal; attachment left alone");
        return Ok(());
    }

    let key = meal_id.to_string();
    if let Err(e) = st.storage.delete_object(&key).await {
        warn!(error = %e, %user_id, %key, "meal deleted but attachment delete failed; blob orphaned");
        return Err(e.into());
    }
    Ok(())
}

// Millisecond precision survives every backend unchanged.
fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000_000))
}
