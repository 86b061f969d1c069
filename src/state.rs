use crate::config::{AppConfig, JwtConfig, MealsBackend, S3Config, StoreConfig};
use crate::meals::{DynamoMealStore, InMemoryMealStore, MealStore, PgMealStore};
use crate::storage::{Storage, StorageClient};
use anyhow::Context;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub meals: Arc<dyn MealStore>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let meals: Arc<dyn MealStore> = match config.store.backend {
            MealsBackend::DynamoDb => Arc::new(DynamoMealStore::new(&shared, &config.store)),
            MealsBackend::Postgres => {
                let url = config
                    .store
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL")?;
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                Arc::new(PgMealStore::new(db))
            }
            MealsBackend::Memory => {
                tracing::warn!("MEALS_BACKEND=memory; meals are lost on restart");
                Arc::new(InMemoryMealStore::new())
            }
        };

        let storage = Arc::new(Storage::new(&shared, &config.s3)) as Arc<dyn StorageClient>;

        tracing::info!(backend = ?config.store.backend, bucket = %config.s3.bucket, "state initialised");
        Ok(Self {
            config,
            meals,
            storage,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        meals: Arc<dyn MealStore>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            config,
            meals,
            storage,
        }
    }

    /// In-memory meals and a blob store that only signs URLs under `https://fake.local/`.
    pub fn fake() -> Self {
        #[derive(Clone)]
        struct FakeStorage;
        #[async_trait]
        impl StorageClient for FakeStorage {
            async fn delete_object(&self, _k: &str) -> anyhow::Result<()> {
                Ok(())
            }
            async fn presign_put(&self, k: &str, s: u64) -> anyhow::Result<String> {
                Ok(format!(
                    "https://fake.local/{}?X-Amz-Expires={}&X-Amz-Signature=fake",
                    k, s
                ))
            }
        }

        let config = Arc::new(AppConfig {
            region: "us-east-1".into(),
            store: StoreConfig {
                backend: MealsBackend::Memory,
                meals_table: "Meals".into(),
                dynamodb_endpoint: None,
                database_url: None,
            },
            s3: S3Config {
                bucket: "fake".into(),
                endpoint: None,
                access_key: None,
                secret_key: None,
                signed_url_expiration_secs: 300,
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
        });

        Self::from_parts(
            config,
            Arc::new(InMemoryMealStore::new()),
            Arc::new(FakeStorage),
        )
    }
}
