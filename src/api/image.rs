use image::imageops::FilterType;

use crate::error::ApiError;

use super::client::ApiClient;

/// Longest edge of a record image preview, in pixels
const PREVIEW_SIZE: u32 = 320;

/// Decoded image, ready for `iced::widget::image::Handle::from_rgba`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode image bytes and shrink them to fit the preview box.
/// Images already inside the box are kept at their size.
pub fn decode_preview(bytes: &[u8]) -> Result<PreviewPixels, image::ImageError> {
    let mut img = image::load_from_memory(bytes)?;

    if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
        img = img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Lanczos3);
    }

    let rgba = img.to_rgba8();
    Ok(PreviewPixels {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Fetch `GET /api/images/{id}` and decode it off the UI thread
pub async fn fetch_preview(api: ApiClient, image_id: String) -> Result<PreviewPixels, ApiError> {
    let bytes = api.image(&image_id).await?;
    let url = api.endpoint(&["images", &image_id]);

    tokio::task::spawn_blocking(move || decode_preview(&bytes))
        .await
        .map_err(|e| ApiError::decode(&url, e))?
        .map_err(|e| ApiError::decode(&url, e))
}
