use crate::blacklist::is_accepted;
use crate::error::AppError;
use crate::models::{Blacklist, CandidatePhoto};
use crate::source::PhotoSource;

/// Draws random photos for `subject` until one is not blacklisted, then records the download.
///
/// `max_attempts` of `None` keeps drawing forever, which never returns if every photo the
/// source can offer for `subject` is blacklisted.
pub async fn select_photo(
    subject: &str,
    blacklist: &Blacklist,
    source: &dyn PhotoSource,
    max_attempts: Option<u32>,
) -> Result<CandidatePhoto, AppError> {
    let mut attempts: u32 = 0;
    let candidate = loop {
        if let Some(max) = max_attempts {
            if attempts >= max {
                return Err(AppError::ExhaustedCandidates {
                    subject: subject.to_string(),
                    attempts,
                });
            }
        }
        attempts = attempts.saturating_add(1);

        let candidate = source.get_random(subject).await?;
        log::trace!("Candidate for '{}': {:?}", subject, candidate);
        if is_accepted(&candidate, blacklist) {
            break candidate;
        }
        log::warn!(
            "Rejected blacklisted photo for '{}' (attempt {}): {:?}",
            subject,
            attempts,
            candidate.alt_description
        );
    };

    log::debug!(
        "Selected photo for '{}' after {} attempt(s): {}",
        subject,
        attempts,
        candidate.full_url
    );
    source.track_download(&candidate.download_location).await?;
    Ok(candidate)
}
