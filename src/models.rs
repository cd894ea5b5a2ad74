// src/models.rs

use crate::error::AppError;
use crate::format::FormatTag;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageRequest {
    pub subject: String,
    pub formats: Vec<FormatTag>,
}

impl ImageRequest {
    pub fn new(subject: impl Into<String>, formats: Vec<FormatTag>) -> Self {
        Self {
            subject: subject.into(),
            formats,
        }
    }

    /// Checks the subject is usable as a blob key prefix and collapses repeated formats.
    pub fn validate(mut self) -> Result<Self, AppError> {
        let subject = self.subject.trim();
        if subject.is_empty() {
            return Err(AppError::Validation("subject must not be empty".into()));
        }
        if subject == "." || subject == ".." || subject.contains(['/', '\\']) {
            return Err(AppError::Validation(format!(
                "subject '{}' cannot be used as a blob name",
                subject
            )));
        }
        self.subject = subject.to_string();

        let mut seen = HashSet::new();
        self.formats.retain(|tag| seen.insert(*tag));
        Ok(self)
    }
}

/// Body accepted by the HTTP trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchRequest {
    pub images: Vec<ImageRequest>,
}

impl BatchRequest {
    pub fn from_json(body: &[u8]) -> Result<Vec<ImageRequest>, AppError> {
        let batch: BatchRequest =
            serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_requests(batch.images)
    }
}

pub fn validate_requests(requests: Vec<ImageRequest>) -> Result<Vec<ImageRequest>, AppError> {
    if requests.is_empty() {
        return Err(AppError::Validation("images must not be empty".into()));
    }
    let requests = requests
        .into_iter()
        .map(ImageRequest::validate)
        .collect::<Result<Vec<_>, _>>()?;

    let mut subjects = HashSet::new();
    for request in &requests {
        // Two requests for one subject would race on the same blob names.
        if !subjects.insert(request.subject.as_str()) {
            return Err(AppError::Validation(format!(
                "subject '{}' is requested more than once",
                request.subject
            )));
        }
    }
    Ok(requests)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePhoto {
    pub full_url: String,
    pub download_location: String,
    pub alt_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    #[serde(default)]
    pub alt_description: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedVariant {
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedBlob {
    pub blob_name: String,
    pub blob_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub subject: String,
    pub url: String,
    pub alt_description: Option<String>,
    pub download: Vec<DownloadedVariant>,
    pub upload: Vec<UploadedBlob>,
}

pub type RunManifest = Vec<SubjectResult>;
