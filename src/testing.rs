//! In-memory collaborators for unit tests.

use crate::error::AppError;
use crate::models::CandidatePhoto;
use crate::source::PhotoSource;
use crate::store::{BlobStore, Container};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

pub fn photo(id: &str, description: Option<&str>) -> CandidatePhoto {
    CandidatePhoto {
        full_url: format!("https://images.example.com/{}?ixid={}", id, id),
        download_location: format!("https://api.example.com/photos/{}/download", id),
        alt_description: description.map(String::from),
    }
}

/// Serves candidates per subject in order, repeating the last one once the script runs out.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<CandidatePhoto>>>,
    random_calls: Mutex<HashMap<String, usize>>,
    tracked: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
    failing_urls: Mutex<HashSet<String>>,
}

impl ScriptedSource {
    pub fn with(mut self, subject: &str, candidates: Vec<CandidatePhoto>) -> Self {
        self.scripts
            .get_mut()
            .unwrap()
            .insert(subject.to_string(), candidates.into());
        self
    }

    pub fn fail_fetch(self, url: &str) -> Self {
        self.failing_urls.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn random_calls(&self, subject: &str) -> usize {
        *self.random_calls.lock().unwrap().get(subject).unwrap_or(&0)
    }

    pub fn tracked(&self) -> Vec<String> {
        self.tracked.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoSource for ScriptedSource {
    async fn get_random(&self, query: &str) -> Result<CandidatePhoto, AppError> {
        *self
            .random_calls
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default() += 1;

        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts
            .get_mut(query)
            .ok_or_else(|| AppError::Fetch(format!("no photos for '{}'", query)))?;
        if script.len() > 1 {
            Ok(script.pop_front().unwrap())
        } else {
            script
                .front()
                .cloned()
                .ok_or_else(|| AppError::Fetch(format!("no photos for '{}'", query)))
        }
    }

    async fn track_download(&self, location: &str) -> Result<(), AppError> {
        self.tracked.lock().unwrap().push(location.to_string());
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        if self.failing_urls.lock().unwrap().contains(url) {
            return Err(AppError::Fetch(format!("HTTP status 503 for {}", url)));
        }
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(url.as_bytes().to_vec())
    }
}

type Blobs = Arc<Mutex<HashMap<(String, String), Vec<u8>>>>;

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Blobs,
    read_only: HashSet<String>,
}

impl MemoryBlobStore {
    /// Makes writes to `container` fail.
    pub fn read_only(mut self, container: &str) -> Self {
        self.read_only.insert(container.to_string());
        self
    }

    pub fn get(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, container: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn container(&self, name: &str) -> Result<Arc<dyn Container>, AppError> {
        Ok(Arc::new(MemoryContainer {
            name: name.to_string(),
            blobs: self.blobs.clone(),
            read_only: self.read_only.contains(name),
        }))
    }
}

struct MemoryContainer {
    name: String,
    blobs: Blobs,
    read_only: bool,
}

#[async_trait]
impl Container for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        if self.read_only {
            return Err(AppError::Store(format!("{}/{} is read-only", self.name, key)));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert((self.name.clone(), key.to_string()), bytes);
        Ok(format!("memory://{}/{}", self.name, key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError> {
        self.blobs
            .lock()
            .unwrap()
            .get(&(self.name.clone(), key.to_string()))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", self.name, key)))
    }
}
