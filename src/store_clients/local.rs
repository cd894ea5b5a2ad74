use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::{BlobStore, Container};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Blob store backed by one directory per container under `root`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: Url,
}

impl LocalBlobStore {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Self::with_root(
            &config.storage.root_directory,
            &config.storage.public_base_url,
        )
    }

    pub fn with_root(root: impl AsRef<Path>, public_base_url: &str) -> Result<Self, AppError> {
        log::debug!("Initializing local blob store at {:?}", root.as_ref());
        let public_base_url = Url::parse(public_base_url).map_err(|e| {
            AppError::Configuration(format!("blob store base URL {}: {}", public_base_url, e))
        })?;
        if public_base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "blob store base URL {} cannot carry a path",
                public_base_url
            )));
        }
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            public_base_url,
        })
    }
}

fn check_name(kind: &str, name: &str) -> Result<(), AppError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(AppError::Store(format!("invalid {} name '{}'", kind, name)));
    }
    Ok(())
}

/// Appends `segment` to the path of `base`, percent-encoding it.
fn child_url(base: &Url, segment: &str) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Store(format!("{} cannot carry a path", base)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn container(&self, name: &str) -> Result<Arc<dyn Container>, AppError> {
        check_name("container", name)?;
        let directory = self.root.join(name);
        if tokio::fs::metadata(&directory).await.is_err() {
            tokio::fs::create_dir_all(&directory).await.map_err(|e| {
                AppError::Store(format!("cannot create container {}: {}", name, e))
            })?;
            log::info!("Created container directory {:?}", directory);
        }
        Ok(Arc::new(LocalContainer {
            name: name.to_string(),
            directory,
            public_base_url: child_url(&self.public_base_url, name)?,
        }))
    }
}

struct LocalContainer {
    name: String,
    directory: PathBuf,
    public_base_url: Url,
}

#[async_trait]
impl Container for LocalContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        check_name("blob", key)?;
        let blob_url = child_url(&self.public_base_url, key)?;
        let directory = self.directory.clone();
        let path = self.directory.join(key);
        let len = bytes.len();

        // Unique staging file per write, renamed over the blob.
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut staging = tempfile::Builder::new()
                .prefix(".")
                .suffix(".partial")
                .tempfile_in(&directory)?;
            staging.write_all(&bytes)?;
            staging.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Store(format!("write {}/{}: {}", self.name, key, e)))?
        .map_err(|e| AppError::Store(format!("write {}/{}: {}", self.name, key, e)))?;

        log::trace!("Wrote {} bytes to {}/{}", len, self.name, key);
        Ok(blob_url.to_string())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError> {
        check_name("blob", key)?;
        match tokio::fs::read(self.directory.join(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("{}/{}", self.name, key)))
            }
            Err(e) => Err(AppError::Store(format!("read {}/{}: {}", self.name, key, e))),
        }
    }
}
