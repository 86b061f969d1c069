//! Client side of the meal planner: a typed HTTP client for the meal endpoints
//! and the view state of the list and edit pages. Rendering is left to the UI.

pub mod api;
pub mod edit_meal;
pub mod meals_view;

pub use api::{ClientError, HttpMealsApi, MealsApi};
pub use edit_meal::{EditMeal, UploadState};
pub use meals_view::MealsView;

/// Message shown to the user when a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Alert(pub String);
