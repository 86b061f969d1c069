use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Which key-value store holds the meal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealsBackend {
    DynamoDb,
    Postgres,
    Memory,
}

impl FromStr for MealsBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown MEALS_BACKEND: {other}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: MealsBackend,
    pub meals_table: String,
    pub dynamodb_endpoint: Option<String>,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub signed_url_expiration_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub region: String,
    pub store: StoreConfig,
    pub s3: S3Config,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = std::env::var("MEALS_BACKEND")
            .unwrap_or_else(|_| "dynamodb".into())
            .parse::<MealsBackend>()?;
        let database_url = std::env::var("DATABASE_URL").ok();
        if backend == MealsBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when MEALS_BACKEND=postgres");
        }

        let store = StoreConfig {
            backend,
            meals_table: std::env::var("MEALS_TABLE").unwrap_or_else(|_| "Meals".into()),
            dynamodb_endpoint: std::env::var("DYNAMODB_ENDPOINT").ok(),
            database_url,
        };
        let s3 = S3Config {
            bucket: std::env::var("IMAGES_S3_BUCKET").context("IMAGES_S3_BUCKET")?,
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            access_key: std::env::var("S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("S3_SECRET_KEY").ok(),
            signed_url_expiration_secs: std::env::var("SIGNED_URL_EXPIRATION")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(300),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "meal-planner".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "meal-planner-users".into()),
        };
        Ok(Self {
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into()),
            store,
            s3,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("dynamodb".parse::<MealsBackend>().unwrap(), MealsBackend::DynamoDb);
        assert_eq!("Postgres".parse::<MealsBackend>().unwrap(), MealsBackend::Postgres);
        assert_eq!(" memory ".parse::<MealsBackend>().unwrap(), MealsBackend::Memory);
        assert!("redis".parse::<MealsBackend>().is_err());
    }
}
