/// Thumbnail loader
///
/// Plays the part of a platform image loader: fetches the bytes behind a
/// reference and decodes them into an iced image handle. It knows nothing
/// about fallbacks; a failure is simply reported back to the element that
/// asked.
use ::image::imageops::FilterType;
use iced::widget::image::Handle as ImageHandle;
use std::path::Path;
use tokio::task;

use crate::error::{ImageUnavailable, UnavailableCause};

/// Decoded images larger than this on either edge are downscaled
const MAX_EDGE: u32 = 512;

/// A decoded image ready for display
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub handle: ImageHandle,
}

impl LoadedImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            handle: ImageHandle::from_rgba(width, height, pixels),
        }
    }
}

/// Load and decode the image behind `reference`.
pub async fn load(
    reference: String,
    client: reqwest::Client,
) -> Result<LoadedImage, ImageUnavailable> {
    let bytes = fetch(&reference, &client).await?;

    let decode_reference = reference.clone();
    task::spawn_blocking(move || decode(&decode_reference, &bytes))
        .await
        .map_err(|e| {
            ImageUnavailable::new(
                reference,
                UnavailableCause::Decode(format!("task join error: {}", e)),
            )
        })?
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

async fn fetch(reference: &str, client: &reqwest::Client) -> Result<Vec<u8>, ImageUnavailable> {
    let failed = |e: &dyn std::fmt::Display| {
        ImageUnavailable::new(reference, UnavailableCause::Fetch(e.to_string()))
    };

    if is_remote(reference) {
        let response = client
            .get(reference)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(&e))?;
        let bytes = response.bytes().await.map_err(|e| failed(&e))?;
        Ok(bytes.to_vec())
    } else {
        let path = reference.strip_prefix("file://").unwrap_or(reference);
        tokio::fs::read(Path::new(path)).await.map_err(|e| failed(&e))
    }
}

fn decode(reference: &str, bytes: &[u8]) -> Result<LoadedImage, ImageUnavailable> {
    let img = ::image::load_from_memory(bytes).map_err(|e| {
        ImageUnavailable::new(reference, UnavailableCause::Decode(e.to_string()))
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageUnavailable::new(reference, UnavailableCause::Empty));
    }

    let img = if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(reference, width, height, "decoded thumbnail");

    Ok(LoadedImage::from_rgba(width, height, rgba.into_raw()))
}
