use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateMealRequest, CreatedMealResponse, ListMealsResponse, UpdateMealRequest,
    UploadUrlResponse,
};
use super::repo::StoreError;
use super::services;
use crate::{auth::AuthUser, state::AppState};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals", get(list_meals))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/:meal_id", patch(update_meal).delete(delete_meal))
        .route("/meals/:meal_id/attachment", post(generate_upload_url))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ListMealsResponse>, (StatusCode, String)> {
    let items = services::list_items(&state, &user_id)
        .await
        .map_err(|e| store_error(e, "list_meals"))?;
    Ok(Json(ListMealsResponse { items }))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<CreatedMealResponse>), (StatusCode, String)> {
    if body.name.trim().is_empty() || body.due_date.trim().is_empty() {
        warn!(%user_id, "create_meal without name or dueDate");
        return Err((
            StatusCode::BAD_REQUEST,
            "name and dueDate are required".into(),
        ));
    }

    let item = services::create_item(&state, &user_id, body)
        .await
        .map_err(|e| store_error(e, "create_meal"))?;
    Ok((StatusCode::CREATED, Json(CreatedMealResponse { item })))
}

#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<Uuid>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::update_item(&state, &user_id, meal_id, body.into())
        .await
        .map_err(|e| store_error(e, "update_meal"))?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::delete_item(&state, &user_id, meal_id)
        .await
        .map_err(|e| store_error(e, "delete_meal"))?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn generate_upload_url(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(meal_id): Path<Uuid>,
) -> Result<Json<UploadUrlResponse>, (StatusCode, String)> {
    let upload_url = services::generate_upload_url(&state, &user_id, meal_id)
        .await
        .map_err(|e| store_error(e, "generate_upload_url"))?;
    Ok(Json(UploadUrlResponse { upload_url }))
}

fn store_error(e: StoreError, op: &'static str) -> (StatusCode, String) {
    match e {
        StoreError::NotFound { meal_id } => {
            warn!(%meal_id, op, "meal not found");
            (StatusCode::NOT_FOUND, "Meal not found".into())
        }
        StoreError::Backend(e) => {
            let chain = format!("{e:#}");
            error!(error = %chain, op, "store call failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".into())
        }
    }
}
