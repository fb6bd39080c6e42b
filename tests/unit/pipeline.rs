use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::store::{AssistantRecord, MemoryStore};

const ID: &str = "507f1f77bcf86cd799439011";

fn fonts() -> Arc<FontSet> {
    Arc::new(crate::assets::fonts::fixture_font_set())
}

fn record() -> AssistantRecord {
    AssistantRecord {
        id: AssistantId::parse(ID).unwrap(),
        name: "Helper".to_string(),
        description: "A test assistant".to_string(),
        created_by_name: "Alice".to_string(),
    }
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    image::RgbaImage::from_pixel(32, 32, image::Rgba([240, 40, 40, 255]))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn renderer(store: MemoryStore, fonts: Arc<FontSet>, config: RendererConfig) -> ThumbnailRenderer {
    let store = Arc::new(store);
    ThumbnailRenderer::new(store.clone(), store, fonts, config)
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

#[tokio::test]
async fn malformed_id_is_not_found_without_touching_the_bucket() {
    let fonts = fonts();
    let store = Arc::new(MemoryStore::new());
    let r = ThumbnailRenderer::new(store.clone(), store.clone(), fonts, RendererConfig::default());
    for raw in ["not-an-id", "", "507f1f77bcf86cd79943901z"] {
        let err = r.render(raw).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::NotFound(_)), "{raw}: {err}");
    }
    assert_eq!(store.downloads_opened(), 0);
}

#[tokio::test]
async fn unknown_assistant_is_not_found() {
    let fonts = fonts();
    let r = renderer(MemoryStore::new(), fonts, RendererConfig::default());
    let err = r.render(ID).await.unwrap_err();
    assert!(matches!(err, ThumbnailError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn assistant_without_avatar_renders_full_size_png() {
    let fonts = fonts();
    let mut store = MemoryStore::new();
    store.insert_assistant(record());
    let r = renderer(store, fonts, RendererConfig::default());

    let png = r.render(ID).await.unwrap();
    let img = decode(&png);
    assert_eq!(img.dimensions(), (1200, 648));
    // Opaque card background.
    assert_eq!(img.get_pixel(2, 2).0[3], 255);
}

#[tokio::test]
async fn avatar_is_drawn_and_output_is_deterministic() {
    let fonts = fonts();
    let mut store = MemoryStore::new();
    store.insert_assistant(record()).insert_blob(ID, &png_bytes(), 100);
    let r = renderer(store, fonts, RendererConfig::default());

    let a = r.render(ID).await.unwrap();
    let b = r.render(ID).await.unwrap();
    assert_eq!(a, b);

    let img = decode(&a);
    let reddish = img
        .pixels()
        .filter(|p| p.0[0] > 180 && p.0[1] < 90 && p.0[2] < 90)
        .count();
    assert!(reddish > 10_000, "avatar pixels: {reddish}");
}

#[tokio::test]
async fn broken_avatar_degrades_by_default() {
    let fonts = fonts();
    let mut store = MemoryStore::new();
    store
        .insert_assistant(record())
        .insert_blob(ID, b"definitely not an image", 8);
    let r = renderer(store, fonts, RendererConfig::default());

    let png = r.render(ID).await.unwrap();
    assert_eq!(decode(&png).dimensions(), (1200, 648));
}

#[tokio::test]
async fn non_xml_characters_in_user_text_still_render() {
    for name in ["Helper\u{FFFE}", "Helper\u{FFFF}", "Tab\there", "A\u{7}bell"] {
        let mut store = MemoryStore::new();
        store.insert_assistant(AssistantRecord {
            name: name.to_string(),
            description: "bad \u{FFFF} char".to_string(),
            ..record()
        });
        let r = renderer(store, fonts(), RendererConfig::default());

        let png = r.render(ID).await.unwrap_or_else(|e| panic!("{name:?}: {e}"));
        assert_eq!(decode(&png).dimensions(), (1200, 648));
    }
}

#[tokio::test]
async fn broken_avatar_fails_under_propagate() {
    let fonts = fonts();
    let mut store = MemoryStore::new();
    store
        .insert_assistant(record())
        .insert_failing_blob(ID, &png_bytes(), 64, 1);
    let mut config = RendererConfig::default();
    config.avatar.on_error = AvatarErrorPolicy::Propagate;
    let r = renderer(store, fonts, config);

    let err = r.render(ID).await.unwrap_err();
    assert!(matches!(err, ThumbnailError::Store(_)), "{err}");
}

#[tokio::test]
async fn slow_lookup_times_out() {
    let fonts = fonts();
    let mut store = MemoryStore::new();
    store
        .insert_assistant(record())
        .with_lookup_delay(Duration::from_secs(5));
    let config = RendererConfig {
        request_timeout_ms: 50,
        ..RendererConfig::default()
    };
    let r = renderer(store, fonts, config);

    let err = r.render(ID).await.unwrap_err();
    assert!(
        matches!(err, ThumbnailError::Timeout(d) if d == Duration::from_millis(50)),
        "{err}"
    );
}

#[tokio::test]
async fn card_text_comes_from_the_record() {
    let fonts = fonts();
    let rec = record();
    let card = render_card(
        &CardProps {
            name: &rec.name,
            description: &rec.description,
            created_by_name: &rec.created_by_name,
            avatar: None,
        },
        &RendererConfig::default().theme,
    );
    let doc = compose_svg(&card, RendererConfig::default().canvas, &fonts).unwrap();
    assert!(doc.markup.contains(">Helper</text>"));
    assert!(doc.markup.contains(">A test assistant</text>"));
    assert!(doc.markup.contains(">Created by Alice</text>"));
}
