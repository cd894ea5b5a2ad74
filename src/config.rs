use crate::error::AppError;
use crate::models::{validate_requests, ImageRequest};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct UnsplashConfig {
    pub api_url: String,
    pub access_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub root_directory: String,
    pub public_base_url: String,
    pub images_container: String,
    pub blacklist_container: String,
    pub blacklist_key: String,
    pub manifest_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub run_on_start: bool,
    #[serde(default)]
    pub images: Vec<ImageRequest>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub web_port: u16,
    pub http_timeout_secs: u64,
    /// Zero keeps the photo selector drawing until it finds an acceptable photo.
    pub max_selection_attempts: u32,
    pub unsplash: UnsplashConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn new(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)))
            .add_source(File::with_name(&format!("{}/{}", config_dir, env)).required(false))
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false))
            .add_source(Environment::with_prefix("IMAGE_DOWNLOADER").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Rejects settings the pipeline cannot start with and normalizes the scheduled
    /// requests in place, the same way trigger bodies are normalized.
    pub fn validate(&mut self) -> Result<(), AppError> {
        if self.unsplash.access_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "unsplash.access_key is not set".into(),
            ));
        }
        Url::parse(&self.unsplash.api_url).map_err(|e| {
            AppError::Configuration(format!("unsplash.api_url is not a valid URL: {}", e))
        })?;
        Url::parse(&self.storage.public_base_url).map_err(|e| {
            AppError::Configuration(format!(
                "storage.public_base_url is not a valid URL: {}",
                e
            ))
        })?;

        for (field, value) in [
            ("storage.root_directory", &self.storage.root_directory),
            ("storage.images_container", &self.storage.images_container),
            ("storage.blacklist_container", &self.storage.blacklist_container),
            ("storage.blacklist_key", &self.storage.blacklist_key),
            ("storage.manifest_key", &self.storage.manifest_key),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("{} is empty", field)));
            }
        }
        if self.storage.images_container == self.storage.blacklist_container {
            return Err(AppError::Configuration(
                "images and blacklist containers must be distinct".into(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "http_timeout_secs must be positive".into(),
            ));
        }

        if self.schedule.enabled && self.schedule.interval_secs == 0 {
            return Err(AppError::Configuration(
                "schedule.interval_secs must be positive".into(),
            ));
        }
        if self.schedule.enabled || !self.schedule.images.is_empty() {
            let images = std::mem::take(&mut self.schedule.images);
            self.schedule.images = validate_requests(images).map_err(|e| {
                AppError::Configuration(format!("schedule.images: {}", e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        AppConfig {
            log_level: "debug".into(),
            web_port: 7071,
            http_timeout_secs: 30,
            max_selection_attempts: 10,
            unsplash: UnsplashConfig {
                api_url: "https://api.unsplash.com".into(),
                access_key: "test-key".into(),
            },
            storage: StorageConfig {
                root_directory: "./data/blobs".into(),
                public_base_url: "http://localhost:7071/blobs".into(),
                images_container: "images".into(),
                blacklist_container: "blacklist".into(),
                blacklist_key: "blacklist.json".into(),
                manifest_key: "imagesDownloaded.json".into(),
            },
            schedule: ScheduleConfig {
                enabled: false,
                interval_secs: 86400,
                run_on_start: false,
                images: vec![],
            },
        }
    }
}
