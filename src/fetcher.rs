use crate::error::AppError;
use crate::format::{resolve, FormatTag};
use crate::models::{DownloadedVariant, UploadedBlob};
use crate::source::PhotoSource;
use crate::store::Container;

pub fn blob_name(subject: &str, format: FormatTag) -> String {
    format!("{}-{}.jpg", subject, format)
}

/// Downloads one crop variant of `base_url` and stores it as `{subject}-{format}.jpg`.
pub async fn materialize(
    subject: &str,
    base_url: &str,
    format: FormatTag,
    source: &dyn PhotoSource,
    container: &dyn Container,
) -> Result<(DownloadedVariant, UploadedBlob), AppError> {
    let image_url = resolve(base_url, format);
    log::debug!("Downloading {} variant for '{}'", format, subject);
    let bytes = source.fetch(&image_url).await?;

    let name = blob_name(subject, format);
    log::trace!("Uploading {} bytes to {}/{}", bytes.len(), container.name(), name);
    let blob_url = container.write(&name, bytes).await?;
    log::debug!("Stored {} at {}", name, blob_url);

    Ok((
        DownloadedVariant { image_url },
        UploadedBlob {
            blob_name: name,
            blob_url,
        },
    ))
}
