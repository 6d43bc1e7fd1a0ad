//! Configuration module
//!
//! Settings are read from the process environment (after loading `.env` if
//! present) and validated once at startup.

use std::env;
use std::str::FromStr;

use crate::media::{
    AllowedExtensions, DEFAULT_AUDIO_EXTENSIONS, DEFAULT_IMAGE_EXTENSIONS,
    DEFAULT_VIDEO_EXTENSIONS,
};
use crate::storage_types::AssetStoreBackend;

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_MINUTES: i64 = 90;
const CHUNK_SIZE_BYTES: usize = 6_000_000;
const MAX_IMAGE_SIZE_MB: usize = 10;
const MAX_AUDIO_SIZE_MB: usize = 200;
const MAX_VIDEO_SIZE_MB: usize = 500;
const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Server, database and auth settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
}

/// Media host settings consumed by the asset store adapter
#[derive(Clone, Debug)]
pub struct AssetStoreConfig {
    pub backend: AssetStoreBackend,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: String,
    /// Upper bound for one chunk of an audio/video upload
    pub chunk_size_bytes: usize,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
}

/// Upload rules per media kind
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub image_allowed_extensions: Vec<String>,
    pub audio_allowed_extensions: Vec<String>,
    pub video_allowed_extensions: Vec<String>,
    pub max_image_size_bytes: usize,
    pub max_audio_size_bytes: usize,
    pub max_video_size_bytes: usize,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub asset_store: AssetStoreConfig,
    pub media: MediaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let base = BaseConfig {
            environment,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins: parse_list(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string())),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_minutes: env_or("JWT_EXPIRY_MINUTES", JWT_EXPIRY_MINUTES),
        };

        let backend = match env::var("ASSET_STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => AssetStoreBackend::Cloudinary,
        };

        let asset_store = AssetStoreConfig {
            backend,
            cloud_name: env::var("CLOUD_NAME").ok(),
            api_key: env::var("API_KEY").ok(),
            api_secret: env::var("API_SECRET").ok(),
            api_base_url: env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| CLOUDINARY_API_BASE.to_string()),
            chunk_size_bytes: env_or("ASSET_CHUNK_SIZE_BYTES", CHUNK_SIZE_BYTES),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./media".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/media", base.server_port)),
        };

        let media = MediaConfig {
            image_allowed_extensions: env_list("IMAGE_ALLOWED_EXTENSIONS", DEFAULT_IMAGE_EXTENSIONS),
            audio_allowed_extensions: env_list("AUDIO_ALLOWED_EXTENSIONS", DEFAULT_AUDIO_EXTENSIONS),
            video_allowed_extensions: env_list("VIDEO_ALLOWED_EXTENSIONS", DEFAULT_VIDEO_EXTENSIONS),
            max_image_size_bytes: env_or("MAX_IMAGE_SIZE_MB", MAX_IMAGE_SIZE_MB) * 1024 * 1024,
            max_audio_size_bytes: env_or("MAX_AUDIO_SIZE_MB", MAX_AUDIO_SIZE_MB) * 1024 * 1024,
            max_video_size_bytes: env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB) * 1024 * 1024,
        };

        Ok(Config {
            base,
            asset_store,
            media,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.base.database_url.starts_with("postgres://")
            || self.base.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.asset_store.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("ASSET_CHUNK_SIZE_BYTES must be greater than 0"));
        }

        if self.asset_store.backend == AssetStoreBackend::Cloudinary {
            let missing: Vec<&str> = [
                ("CLOUD_NAME", &self.asset_store.cloud_name),
                ("API_KEY", &self.asset_store.api_key),
                ("API_SECRET", &self.asset_store.api_secret),
            ]
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect();

            if !missing.is_empty() {
                return Err(anyhow::anyhow!(
                    "{} must be set when using the cloudinary asset store",
                    missing.join(", ")
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.base.server_host, self.base.server_port)
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn jwt_expiry_minutes(&self) -> i64 {
        self.base.jwt_expiry_minutes
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn allowed_extensions(&self) -> AllowedExtensions {
        AllowedExtensions::new(
            self.media.image_allowed_extensions.clone(),
            self.media.audio_allowed_extensions.clone(),
            self.media.video_allowed_extensions.clone(),
        )
    }

    /// Largest request body the API accepts: a record upload carries one
    /// image plus one audio or video file.
    pub fn max_request_body_bytes(&self) -> usize {
        self.media.max_image_size_bytes
            + self
                .media
                .max_audio_size_bytes
                .max(self.media.max_video_size_bytes)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => parse_list(&raw),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Split a comma separated value, trimming and lowercasing each entry.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
