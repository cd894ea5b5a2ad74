use crate::error::AppError;
use crate::models::{Blacklist, CandidatePhoto};
use crate::store::Container;

pub fn is_accepted(candidate: &CandidatePhoto, blacklist: &Blacklist) -> bool {
    let description = candidate.alt_description.as_deref().unwrap_or("");
    !blacklist.alt_description.contains(description)
}

/// Reads the blacklist document. A missing document is an empty blacklist.
pub async fn load_blacklist(container: &dyn Container, key: &str) -> Result<Blacklist, AppError> {
    log::debug!("Loading blacklist from {}/{}", container.name(), key);
    match container.read(key).await {
        Ok(bytes) => {
            let blacklist: Blacklist = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Store(format!("malformed blacklist {}: {}", key, e)))?;
            log::info!(
                "Loaded blacklist with {} descriptions",
                blacklist.alt_description.len()
            );
            Ok(blacklist)
        }
        Err(AppError::NotFound(_)) => {
            log::warn!(
                "Blacklist {}/{} not found, continuing without one",
                container.name(),
                key
            );
            Ok(Blacklist::default())
        }
        Err(e) => Err(e),
    }
}
