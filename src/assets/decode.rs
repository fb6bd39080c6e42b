use base64::Engine as _;

use crate::foundation::error::{ThumbnailError, ThumbnailResult};

/// JPEG quality used for embedded avatars.
pub const AVATAR_JPEG_QUALITY: u8 = 90;

/// Image bytes ready to embed in markup as a `data:` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

/// Decode any supported raster format and re-encode it as JPEG.
///
/// Images larger than `max_px` on either side are downscaled (aspect preserved). Alpha is composited
/// over black, since JPEG carries no transparency.
pub fn transcode_to_jpeg(bytes: &[u8], max_px: u32) -> ThumbnailResult<InlineImage> {
    let mut dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ThumbnailError::transcode(format!("decode avatar: {e}")))?;
    if max_px > 0 && (dyn_img.width() > max_px || dyn_img.height() > max_px) {
        dyn_img = dyn_img.resize(max_px, max_px, image::imageops::FilterType::Triangle);
    }

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut raw = rgba.into_raw();
    premultiply_rgba8_in_place(&mut raw);
    let rgb: Vec<u8> = raw
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let rgb = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| ThumbnailError::transcode("invalid rgb buffer size"))?;

    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, AVATAR_JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ThumbnailError::transcode(format!("encode avatar jpeg: {e}")))?;

    Ok(InlineImage {
        mime: "image/jpeg",
        width,
        height,
        data_url: data_url("image/jpeg", &jpeg),
    })
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
