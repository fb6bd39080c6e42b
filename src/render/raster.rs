use std::io::Cursor;
use std::sync::Arc;

use crate::assets::fonts::FontSet;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::render::compose::SvgDocument;

const MAX_DIM: u32 = 16_384;

/// Rasterize `doc` at its intrinsic size and encode it as PNG.
///
/// Text resolves against `fontdb`; embedded `data:` images are decoded by resvg.
#[tracing::instrument(level = "debug", skip_all, fields(width = doc.width, height = doc.height))]
pub fn rasterize_png(
    doc: &SvgDocument,
    fontdb: Arc<usvg::fontdb::Database>,
) -> ThumbnailResult<Vec<u8>> {
    let (width, height) = (doc.width, doc.height);
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(ThumbnailError::raster(format!(
            "invalid raster size {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let opts = usvg::Options {
        fontdb,
        font_resolver: FontSet::svg_font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&doc.markup, &opts)
        .map_err(|e| ThumbnailError::raster(format!("parse svg document: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ThumbnailError::raster("failed to allocate pixmap"))?;
    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let mut rgba = pixmap.take();
    unpremultiply_in_place(&mut rgba);
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ThumbnailError::raster("invalid rgba buffer size"))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ThumbnailError::raster(format!("encode png: {e}")))?;
    tracing::debug!(bytes = png.len(), "encoded png");
    Ok(png)
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
