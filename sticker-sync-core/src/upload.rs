use reqwest::Url;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::contract::{NewSticker, Uploader};
use crate::error::SyncError;
use crate::validate::NormalizedRecord;

/// Extension used when the image URL does not reveal one.
const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Outcome of one successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedSticker {
    pub name: String,
    pub filename: String,
    pub size: usize,
}

/// Download the record's image and create the sticker on the destination.
pub async fn upload_record<U>(
    uploader: &U,
    record: &NormalizedRecord,
) -> Result<UploadedSticker, SyncError>
where
    U: Uploader + ?Sized,
{
    debug!(name = %record.name, url = %record.image_url, "Downloading sticker image");
    let image = uploader.fetch_image(&record.image_url).await.map_err(|e| {
        error!(error = %e, name = %record.name, "Failed to download sticker image");
        SyncError::ImageDownload {
            name: record.name.clone(),
            url: record.image_url.clone(),
            source: e,
        }
    })?;

    let filename = sticker_filename(&record.image_url);
    let size = image.len();
    info!(name = %record.name, filename = %filename, size, "Creating sticker");

    uploader
        .create_sticker(NewSticker {
            name: record.name.clone(),
            filename: filename.clone(),
            image,
        })
        .await
        .map_err(|e| {
            error!(error = %e, name = %record.name, "Failed to create sticker");
            SyncError::Upload {
                name: record.name.clone(),
                source: e,
            }
        })?;

    Ok(UploadedSticker {
        name: record.name.clone(),
        filename,
        size,
    })
}

/// A fresh `<uuid>.<ext>` filename, keeping the extension of the image URL's path.
pub fn sticker_filename(image_url: &str) -> String {
    let extension = Url::parse(image_url)
        .ok()
        .and_then(|url| {
            let last = url.path_segments()?.last()?.to_string();
            let (_, ext) = last.rsplit_once('.')?;
            let ext = ext.to_ascii_lowercase();
            let plausible =
                !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
            plausible.then_some(ext)
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());
    format!("{}.{}", Uuid::new_v4(), extension)
}
