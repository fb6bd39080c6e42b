use super::*;
use crate::assets::decode::transcode_to_jpeg;
use crate::foundation::core::{Canvas, Rgba8};
use crate::render::compose::{Paint, emit_svg};

fn empty_db() -> Arc<usvg::fontdb::Database> {
    Arc::new(usvg::fontdb::Database::new())
}

fn small_canvas() -> Canvas {
    Canvas {
        width: 64,
        height: 32,
    }
}

#[test]
fn rect_document_rasterizes_to_png_of_document_size() {
    let doc = emit_svg(
        small_canvas(),
        &[Paint::Rect {
            x: 0.0,
            y: 0.0,
            w: 64.0,
            h: 32.0,
            radius: 0.0,
            fill: Rgba8::rgb(0x3b, 0x82, 0xf6),
        }],
    );
    let png = rasterize_png(&doc, empty_db()).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 32));
    assert_eq!(img.get_pixel(10, 10).0, [0x3b, 0x82, 0xf6, 255]);
}

#[test]
fn uncovered_pixels_are_transparent() {
    let doc = emit_svg(small_canvas(), &[]);
    let png = rasterize_png(&doc, empty_db()).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn embedded_jpeg_avatar_is_drawn() {
    let mut src = Vec::new();
    image::RgbaImage::from_pixel(16, 16, image::Rgba([220, 20, 20, 255]))
        .write_to(&mut Cursor::new(&mut src), image::ImageFormat::Png)
        .unwrap();
    let avatar = transcode_to_jpeg(&src, 512).unwrap();

    let doc = emit_svg(
        small_canvas(),
        &[Paint::Image {
            x: 0.0,
            y: 0.0,
            w: 32.0,
            h: 32.0,
            radius: 16.0,
            href: avatar.data_url,
        }],
    );
    let png = rasterize_png(&doc, empty_db()).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();

    let [r, g, b, a] = img.get_pixel(16, 16).0;
    assert_eq!(a, 255);
    assert!(r > 180 && g < 70 && b < 70, "{r} {g} {b}");
    // Clipped to a circle: the corner stays empty.
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    // Right half of the canvas is untouched.
    assert_eq!(img.get_pixel(48, 16).0[3], 0);
}

#[test]
fn malformed_markup_is_a_raster_error() {
    let doc = SvgDocument {
        width: 10,
        height: 10,
        markup: "<svg".to_string(),
    };
    let err = rasterize_png(&doc, empty_db()).unwrap_err();
    assert!(matches!(err, ThumbnailError::Raster(_)), "{err}");
}

#[test]
fn zero_sized_documents_are_rejected() {
    let doc = SvgDocument {
        width: 0,
        height: 10,
        markup: String::new(),
    };
    assert!(matches!(
        rasterize_png(&doc, empty_db()),
        Err(ThumbnailError::Raster(_))
    ));
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let mut px = [64u8, 0, 0, 128, 10, 10, 10, 0];
    unpremultiply_in_place(&mut px);
    assert_eq!(px, [128, 0, 0, 128, 0, 0, 0, 0]);
}
