use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::watch;
use uuid::Uuid;

use super::api::MealsApi;
use super::Alert;
use crate::meals::dto::UpdateMealRequest;

/// Progress of the attachment upload. Only the three discrete phases are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    NoUpload,
    FetchingPresignedUrl,
    UploadingFile,
}

/// State behind the edit page of a single meal.
pub struct EditMeal<A: MealsApi + ?Sized> {
    api: Arc<A>,
    id_token: String,
    meal_id: Uuid,
    pub meal_name: String,
    pub date: String,
    pub done: bool,
    pub recipe: String,
    pub file: Option<Bytes>,
    upload_state: watch::Sender<UploadState>,
}

impl<A: MealsApi + ?Sized> EditMeal<A> {
    pub fn new(api: Arc<A>, id_token: impl Into<String>, meal_id: Uuid) -> Self {
        let (upload_state, _) = watch::channel(UploadState::NoUpload);
        Self {
            api,
            id_token: id_token.into(),
            meal_id,
            meal_name: String::new(),
            date: String::new(),
            done: false,
            recipe: String::new(),
            file: None,
            upload_state,
        }
    }

    pub fn meal_id(&self) -> Uuid {
        self.meal_id
    }

    pub fn upload_state(&self) -> UploadState {
        *self.upload_state.borrow()
    }

    /// Receives every phase change of the upload flow.
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.upload_state.subscribe()
    }

    /// Fills the form from the server's copy of this meal. There is no
    /// single-item endpoint, so the owner's list is fetched and searched.
    pub async fn mount(&mut self) -> Result<(), Alert> {
        let meals = self
            .api
            .get_meals(&self.id_token)
            .await
            .map_err(|e| Alert(format!("Failed to fetch meal: {e}")))?;
        let meal = meals
            .into_iter()
            .find(|m| m.meal_id == self.meal_id)
            .ok_or_else(|| Alert("Failed to fetch meal: not found".into()))?;

        self.meal_name = meal.name;
        self.date = meal.due_date;
        self.done = meal.done;
        self.recipe = meal.recipe.unwrap_or_default();
        self.file = None;
        self.set_upload_state(UploadState::NoUpload);
        Ok(())
    }

    pub fn select_file(&mut self, file: Bytes) {
        self.file = Some(file);
    }

    pub fn toggle_done(&mut self) {
        self.done = !self.done;
    }

    /// Writes name, date, done and recipe back as one update.
    pub async fn save(&self) -> Result<(), Alert> {
        if self.meal_name.is_empty() || self.date.is_empty() {
            return Err(Alert("Name or Date cannot be empty".into()));
        }
        let req = UpdateMealRequest {
            name: self.meal_name.clone(),
            due_date: self.date.clone(),
            done: self.done,
            recipe: Some(self.recipe.clone()),
        };
        self.api
            .patch_meal(&self.id_token, self.meal_id, &req)
            .await
            .map_err(|e| Alert(format!("Could not update the meal: {e}")))
    }

    /// Fetches a signed URL, then uploads the selected file to it. The state
    /// returns to `NoUpload` whether or not the upload succeeded.
    pub async fn upload(&self) -> Result<(), Alert> {
        let Some(file) = self.file.clone() else {
            return Err(Alert("File should be selected".into()));
        };

        let result = self.run_upload(file).await;
        self.set_upload_state(UploadState::NoUpload);
        result.map_err(|e| Alert(format!("Could not upload a file: {e}")))
    }

    async fn run_upload(&self, file: Bytes) -> Result<(), super::api::ClientError> {
        self.set_upload_state(UploadState::FetchingPresignedUrl);
        let upload_url = self.api.get_upload_url(&self.id_token, self.meal_id).await?;

        self.set_upload_state(UploadState::UploadingFile);
        self.api.upload_file(&upload_url, file).await
    }

    fn set_upload_state(&self, state: UploadState) {
        self.upload_state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{meal, FakeApi};

    #[tokio::test]
    async fn mount_fills_form_from_list() {
        let mut oatmeal = meal("Oatmeal");
        oatmeal.recipe = Some("boil water".into());
        oatmeal.done = true;
        let api = Arc::new(FakeApi::with_meals(vec![meal("Other"), oatmeal.clone()]));

        let mut edit = EditMeal::new(api, "tok", oatmeal.meal_id);
        edit.mount().await.unwrap();

        assert_eq!(edit.meal_name, "Oatmeal");
        assert_eq!(edit.date, oatmeal.due_date);
        assert!(edit.done);
        assert_eq!(edit.recipe, "boil water");
    }

    #[tokio::test]
    async fn mount_of_unknown_meal_alerts() {
        let api = Arc::new(FakeApi::with_meals(vec![meal("Other")]));
        let mut edit = EditMeal::new(api, "tok", Uuid::new_v4());
        let alert = edit.mount().await.unwrap_err();
        assert!(alert.0.starts_with("Failed to fetch meal"));
    }

    #[tokio::test]
    async fn save_requires_name_and_date() {
        let api = Arc::new(FakeApi::default());
        let mut edit = EditMeal::new(api.clone(), "tok", Uuid::new_v4());
        edit.date = "2024-01-10".into();

        let alert = edit.save().await.unwrap_err();
        assert_eq!(alert.0, "Name or Date cannot be empty");
        assert!(api.patched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_sends_all_four_fields() {
        let oatmeal = meal("Oatmeal");
        let api = Arc::new(FakeApi::with_meals(vec![oatmeal.clone()]));
        let mut edit = EditMeal::new(api.clone(), "tok", oatmeal.meal_id);
        edit.mount().await.unwrap();
        edit.recipe = "boil water".into();
        edit.toggle_done();

        edit.save().await.unwrap();
        let patches = api.patched.lock().unwrap();
        let (id, req) = &patches[0];
        assert_eq!(*id, oatmeal.meal_id);
        assert!(req.done);
        assert_eq!(req.recipe.as_deref(), Some("boil water"));
        assert_eq!(req.due_date, oatmeal.due_date);
    }

    #[tokio::test]
    async fn upload_without_file_alerts() {
        let api = Arc::new(FakeApi::default());
        let edit = EditMeal::new(api, "tok", Uuid::new_v4());
        let alert = edit.upload().await.unwrap_err();
        assert_eq!(alert.0, "File should be selected");
        assert_eq!(edit.upload_state(), UploadState::NoUpload);
    }

    #[tokio::test]
    async fn upload_walks_the_phases_in_order() {
        let api = Arc::new(FakeApi::default());
        let mut edit = EditMeal::new(api.clone(), "tok", Uuid::new_v4());
        api.observe(edit.subscribe());
        edit.select_file(Bytes::from_static(b"jpeg"));

        edit.upload().await.unwrap();

        assert_eq!(
            *api.seen_states.lock().unwrap(),
            vec![UploadState::FetchingPresignedUrl, UploadState::UploadingFile]
        );
        assert_eq!(api.uploaded.lock().unwrap()[0], Bytes::from_static(b"jpeg"));
        assert_eq!(edit.upload_state(), UploadState::NoUpload);
    }

    #[tokio::test]
    async fn failed_upload_resets_state() {
        let api = Arc::new(FakeApi::default());
        let mut edit = EditMeal::new(api.clone(), "tok", Uuid::new_v4());
        edit.select_file(Bytes::from_static(b"jpeg"));
        api.fail_writes();

        let alert = edit.upload().await.unwrap_err();
        assert!(alert.0.starts_with("Could not upload a file"));
        assert_eq!(edit.upload_state(), UploadState::NoUpload);
        assert!(api.uploaded.lock().unwrap().is_empty());
    }
}
