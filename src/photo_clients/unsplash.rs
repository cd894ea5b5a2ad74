use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::CandidatePhoto;
use crate::source::PhotoSource;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
    links: PhotoLinks,
    alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    full: String,
}

#[derive(Debug, Deserialize)]
struct PhotoLinks {
    download_location: String,
}

impl From<RandomPhoto> for CandidatePhoto {
    fn from(photo: RandomPhoto) -> Self {
        CandidatePhoto {
            full_url: photo.urls.full,
            download_location: photo.links.download_location,
            alt_description: photo.alt_description,
        }
    }
}

pub struct UnsplashSource {
    client: Client,
    api_url: String,
    access_key: String,
}

impl UnsplashSource {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        log::debug!("Creating Unsplash client for {}", config.unsplash.api_url);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("image_downloader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: config.unsplash.api_url.trim_end_matches('/').to_string(),
            access_key: config.unsplash.access_key.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
    }
}

fn fetch_error(context: &str, e: reqwest::Error) -> AppError {
    AppError::Fetch(format!("{}: {}", context, e.without_url()))
}

#[async_trait]
impl PhotoSource for UnsplashSource {
    async fn get_random(&self, query: &str) -> Result<CandidatePhoto, AppError> {
        let context = format!("random photo for '{}'", query);
        let photos: Vec<RandomPhoto> = self
            .authorized(self.client.get(format!("{}/photos/random", self.api_url)))
            .query(&[("query", query), ("orientation", "landscape"), ("count", "1")])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error(&context, e))?
            .json()
            .await
            .map_err(|e| fetch_error(&context, e))?;
        log::trace!("Unsplash returned {:?}", photos);

        photos
            .into_iter()
            .next()
            .map(CandidatePhoto::from)
            .ok_or_else(|| AppError::Fetch(format!("{}: empty response", context)))
    }

    async fn track_download(&self, location: &str) -> Result<(), AppError> {
        self.authorized(self.client.get(location))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error("download tracking", e))?;
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error("image download", e))?
            .bytes()
            .await
            .map_err(|e| fetch_error("image download", e))?;
        Ok(bytes.to_vec())
    }
}
