use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

use crate::meals::dto::{
    CreateMealRequest, CreatedMealResponse, ListMealsResponse, UpdateMealRequest,
    UploadUrlResponse,
};
use crate::meals::MealItem;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request rejected with status {status}")]
    Rejected { status: StatusCode, body: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Calls the meal endpoints on behalf of one signed-in user.
#[async_trait]
pub trait MealsApi: Send + Sync {
    async fn get_meals(&self, id_token: &str) -> ClientResult<Vec<MealItem>>;
    async fn create_meal(&self, id_token: &str, req: &CreateMealRequest) -> ClientResult<MealItem>;
    async fn patch_meal(
        &self,
        id_token: &str,
        meal_id: Uuid,
        req: &UpdateMealRequest,
    ) -> ClientResult<()>;
    async fn delete_meal(&self, id_token: &str, meal_id: Uuid) -> ClientResult<()>;
    async fn get_upload_url(&self, id_token: &str, meal_id: Uuid) -> ClientResult<String>;
    /// PUTs the file straight to blob storage; the signed URL carries its own authorization.
    async fn upload_file(&self, upload_url: &str, file: Bytes) -> ClientResult<()>;
}

#[derive(Clone)]
pub struct HttpMealsApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMealsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(req: RequestBuilder) -> ClientResult<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, %body, "request rejected");
            return Err(ClientError::Rejected { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl MealsApi for HttpMealsApi {
    async fn get_meals(&self, id_token: &str) -> ClientResult<Vec<MealItem>> {
        let resp = Self::send(self.http.get(self.url("/meals")).bearer_auth(id_token)).await?;
        let body: ListMealsResponse = resp.json().await?;
        Ok(body.items)
    }

    async fn create_meal(&self, id_token: &str, req: &CreateMealRequest) -> ClientResult<MealItem> {
        let resp = Self::send(
            self.http
                .post(self.url("/meals"))
                .bearer_auth(id_token)
                .json(req),
        )
        .await?;
        let body: CreatedMealResponse = resp.json().await?;
        Ok(body.item)
    }

    async fn patch_meal(
        &self,
        id_token: &str,
        meal_id: Uuid,
        req: &UpdateMealRequest,
    ) -> ClientResult<()> {
        Self::send(
            self.http
                .patch(self.url(&format!("/meals/{meal_id}")))
                .bearer_auth(id_token)
                .json(req),
        )
        .await?;
        Ok(())
    }

    async fn delete_meal(&self, id_token: &str, meal_id: Uuid) -> ClientResult<()> {
        Self::send(
            self.http
                .delete(self.url(&format!("/meals/{meal_id}")))
                .bearer_auth(id_token),
        )
        .await?;
        Ok(())
    }

    async fn get_upload_url(&self, id_token: &str, meal_id: Uuid) -> ClientResult<String> {
        let resp = Self::send(
            self.http
                .post(self.url(&format!("/meals/{meal_id}/attachment")))
                .bearer_auth(id_token),
        )
        .await?;
        let body: UploadUrlResponse = resp.json().await?;
        Ok(body.upload_url)
    }

    async fn upload_file(&self, upload_url: &str, file: Bytes) -> ClientResult<()> {
        Self::send(self.http.put(upload_url).body(file)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn meal_json(meal_id: Uuid) -> serde_json::Value {
        json!({
            "userId": "u1",
            "mealId": meal_id,
            "createdAt": "2024-01-03T10:00:00Z",
            "name": "Oatmeal",
            "dueDate": "2024-01-10",
            "done": false
        })
    }

    #[tokio::test]
    async fn get_meals_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let meal_id = Uuid::new_v4();
        let mock = server
            .mock("GET", "/meals")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "items": [meal_json(meal_id)] }).to_string())
            .create_async()
            .await;

        let api = HttpMealsApi::new(server.url());
        let meals = api.get_meals("tok").await.unwrap();

        mock.assert_async().await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].meal_id, meal_id);
        assert!(meals[0].recipe.is_none());
    }

    #[tokio::test]
    async fn create_meal_posts_camel_case_body() {
        let mut server = mockito::Server::new_async().await;
        let meal_id = Uuid::new_v4();
        let mock = server
            .mock("POST", "/meals")
            .match_body(Matcher::Json(json!({ "name": "Oatmeal", "dueDate": "2024-01-10" })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!({ "item": meal_json(meal_id) }).to_string())
            .create_async()
            .await;

        let api = HttpMealsApi::new(format!("{}/", server.url()));
        let req = CreateMealRequest {
            name: "Oatmeal".into(),
            due_date: "2024-01-10".into(),
            recipe: None,
        };
        let item = api.create_meal("tok", &req).await.unwrap();

        mock.assert_async().await;
        assert_eq!(item.meal_id, meal_id);
        assert!(!item.done);
    }

    #[tokio::test]
    async fn rejected_request_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let meal_id = Uuid::new_v4();
        server
            .mock("PATCH", format!("/meals/{meal_id}").as_str())
            .with_status(404)
            .with_body("Meal not found")
            .create_async()
            .await;

        let api = HttpMealsApi::new(server.url());
        let req = UpdateMealRequest {
            name: "Oatmeal".into(),
            due_date: "2024-01-10".into(),
            done: true,
            recipe: None,
        };
        let err = api.patch_meal("tok", meal_id, &req).await.unwrap_err();
        match err {
            ClientError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "Meal not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn upload_goes_to_signed_url_without_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/bucket/abc")
            .match_query(Matcher::UrlEncoded("X-Amz-Signature".into(), "sig".into()))
            .match_header("authorization", Matcher::Missing)
            .match_body("image-bytes")
            .with_status(200)
            .create_async()
            .await;

        let api = HttpMealsApi::new("http://unused.invalid");
        let url = format!("{}/bucket/abc?X-Amz-Signature=sig", server.url());
        api.upload_file(&url, Bytes::from_static(b"image-bytes"))
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
