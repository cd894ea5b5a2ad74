use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("No acceptable photo for subject '{subject}' after {attempts} attempts")]
    ExhaustedCandidates { subject: String, attempts: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message safe to hand back to an HTTP caller.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if self.status_code().is_server_error() {
            redact_urls(&message)
        } else {
            message
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("Request failed: {}", self);
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({
                "error": self.public_message(),
            }))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExhaustedCandidates { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Characters that close a URL embedded in prose, JSON or Debug output.
const URL_DELIMITERS: &[char] = &['"', '\'', '<', '>', '(', ')', '[', ']', '{', '}', '`'];

/// Strips query strings, fragments and credentials from every URL embedded in `message`.
pub fn redact_urls(message: &str) -> String {
    let mut redacted = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(start) = [rest.find("http://"), rest.find("https://")]
        .into_iter()
        .flatten()
        .min()
    {
        redacted.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail
            .find(|c: char| c.is_whitespace() || URL_DELIMITERS.contains(&c))
            .unwrap_or(tail.len());
        let candidate = tail[..end].trim_end_matches(['.', ',', ':', ';', '!', '?']);
        redacted.push_str(&redact_url(candidate));
        rest = &tail[candidate.len()..];
    }
    redacted.push_str(rest);
    redacted
}

fn redact_url(candidate: &str) -> String {
    match Url::parse(candidate) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            let _ = url.set_password(None);
            let _ = url.set_username("");
            url.to_string()
        }
        Err(_) => "<url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::Validation("images must not be empty".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.public_message(),
            "Validation error: images must not be empty"
        );
    }

    #[test]
    fn server_errors_have_query_strings_removed() {
        let err = AppError::Fetch(
            "GET https://images.example.com/photo-1?ixid=secret&fit=crop returned 503".into(),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.public_message(),
            "Fetch error: GET https://images.example.com/photo-1 returned 503"
        );
    }

    #[test]
    fn exhausted_candidates_names_subject() {
        let err = AppError::ExhaustedCandidates {
            subject: "moon".into(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "No acceptable photo for subject 'moon' after 3 attempts"
        );
    }

    #[test]
    fn credentials_are_removed_from_urls() {
        assert_eq!(
            redact_urls("upload to https://user:pw@store.example.com/c/k failed"),
            "upload to https://store.example.com/c/k failed"
        );
    }

    #[test]
    fn wrapped_urls_are_redacted() {
        assert_eq!(
            redact_urls(
                r#"body "https://a.example.com/p?sig=1" (https://b.example.com/q?k=2) <https://c.example.com/r?t=3>"#
            ),
            r#"body "https://a.example.com/p" (https://b.example.com/q) <https://c.example.com/r>"#
        );
        assert_eq!(
            redact_urls(r#"{"url":"https://u:pw@x.example.com/?k=1"}"#),
            r#"{"url":"https://x.example.com/"}"#
        );
        assert_eq!(
            redact_urls("see https://d.example.com/s?crop=faces,edges&ixid=abc."),
            "see https://d.example.com/s."
        );
    }

    #[test]
    fn debug_formatted_error_is_redacted() {
        let err = AppError::Fetch(format!(
            "{:?}",
            ("download", "https://images.example.com/m?ixid=secret")
        ));
        let message = err.public_message();
        assert!(!message.contains("secret"), "{}", message);
        assert!(message.contains("\"https://images.example.com/m\""), "{}", message);
    }
}
