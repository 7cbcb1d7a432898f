use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ProblemConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl ProblemConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        // MONGODB_URI wins when set (local/test deployments); otherwise the
        // URI is assembled from the cluster credentials.
        let uri = match env::var("MONGODB_URI") {
            Ok(uri) => uri,
            Err(_) => {
                let username = get_env("DB_USERNAME", None, is_prod)?;
                let password = get_env("DB_PASSWORD", None, is_prod)?;
                let cluster = get_env("DB_CLUSTER", None, is_prod)?;
                format!(
                    "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
                    username, password, cluster
                )
            }
        };

        Ok(ProblemConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri,
                database: get_env("MONGODB_DATABASE", Some("problem_db"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
