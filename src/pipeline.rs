use crate::blacklist::load_blacklist;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::fetcher::materialize;
use crate::models::{Blacklist, ImageRequest, RunManifest, SubjectResult};
use crate::selector::select_photo;
use crate::source::PhotoSource;
use crate::store::{BlobStore, Container};
use futures::future::try_join_all;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub images_container: String,
    pub blacklist_container: String,
    pub blacklist_key: String,
    pub manifest_key: String,
    pub max_selection_attempts: Option<u32>,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            images_container: config.storage.images_container.clone(),
            blacklist_container: config.storage.blacklist_container.clone(),
            blacklist_key: config.storage.blacklist_key.clone(),
            manifest_key: config.storage.manifest_key.clone(),
            max_selection_attempts: match config.max_selection_attempts {
                0 => None,
                n => Some(n),
            },
        }
    }
}

pub struct Pipeline {
    source: Arc<dyn PhotoSource>,
    store: Arc<dyn BlobStore>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        store: Arc<dyn BlobStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    /// Loads the blacklist, processes every request and overwrites the stored manifest.
    pub async fn run(&self, requests: &[ImageRequest]) -> Result<RunManifest, AppError> {
        let blacklist_container = self
            .store
            .container(&self.settings.blacklist_container)
            .await?;
        let blacklist =
            load_blacklist(blacklist_container.as_ref(), &self.settings.blacklist_key).await?;
        self.run_with_blacklist(requests, &blacklist).await
    }

    pub async fn run_with_blacklist(
        &self,
        requests: &[ImageRequest],
        blacklist: &Blacklist,
    ) -> Result<RunManifest, AppError> {
        log::info!("Starting run for {} subject(s)", requests.len());
        let images = self
            .store
            .container(&self.settings.images_container)
            .await?;

        // Any failed subject aborts the run before the manifest is touched.
        let manifest = try_join_all(
            requests
                .iter()
                .map(|request| self.process_subject(request, blacklist, images.as_ref())),
        )
        .await
        .map_err(|e| {
            log::error!("Run aborted: {}", e);
            e
        })?;

        let body = serde_json::to_vec_pretty(&manifest)?;
        let manifest_url = images.write(&self.settings.manifest_key, body).await?;
        log::info!(
            "Run finished: {} subject(s), manifest at {}",
            manifest.len(),
            manifest_url
        );
        Ok(manifest)
    }

    async fn process_subject(
        &self,
        request: &ImageRequest,
        blacklist: &Blacklist,
        images: &dyn Container,
    ) -> Result<SubjectResult, AppError> {
        let subject = request.subject.as_str();
        let photo = select_photo(
            subject,
            blacklist,
            self.source.as_ref(),
            self.settings.max_selection_attempts,
        )
        .await?;

        let variants = try_join_all(request.formats.iter().map(|format| {
            materialize(
                subject,
                &photo.full_url,
                *format,
                self.source.as_ref(),
                images,
            )
        }))
        .await?;
        let (download, upload) = variants.into_iter().unzip();

        log::info!(
            "Subject '{}' done with {} variant(s)",
            subject,
            request.formats.len()
        );
        Ok(SubjectResult {
            subject: subject.to_string(),
            url: photo.full_url,
            alt_description: photo.alt_description,
            download,
            upload,
        })
    }

    /// Reads the manifest written by the last successful run.
    pub async fn last_manifest(&self) -> Result<RunManifest, AppError> {
        let images = self
            .store
            .container(&self.settings.images_container)
            .await?;
        let bytes = images.read(&self.settings.manifest_key).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
