use std::io::Cursor;

use super::*;
use crate::store::MemoryStore;

const KEY: &str = "507f1f77bcf86cd799439011";

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([10, 200, 10, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn missing_blob_is_an_empty_avatar() {
    let store = MemoryStore::new();
    let got = fetch_avatar(&store, KEY, &AvatarConfig::default())
        .await
        .unwrap();
    assert!(got.is_none());
    assert_eq!(store.downloads_opened(), 0);
}

#[tokio::test]
async fn chunked_blob_is_reassembled_and_inlined_as_jpeg() {
    let mut store = MemoryStore::new();
    store.insert_blob(KEY, &png_bytes(), 7);

    let got = fetch_avatar(&store, KEY, &AvatarConfig::default())
        .await
        .unwrap()
        .unwrap();
    assert!(got.data_url.starts_with("data:image/jpeg;base64,"));
    assert_eq!((got.width, got.height), (16, 16));
    assert_eq!(store.downloads_opened(), 1);
}

#[tokio::test]
async fn stream_failure_is_a_store_error() {
    let mut store = MemoryStore::new();
    store.insert_failing_blob(KEY, &png_bytes(), 64, 0);

    let err = fetch_avatar(&store, KEY, &AvatarConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ThumbnailError::Store(_)), "{err}");
}

#[tokio::test]
async fn corrupt_blob_is_a_transcode_error() {
    let mut store = MemoryStore::new();
    store.insert_blob(KEY, b"\x89PNG but not really", 4);

    let err = fetch_avatar(&store, KEY, &AvatarConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ThumbnailError::Transcode(_)), "{err}");
}

#[tokio::test]
async fn oversized_blob_is_rejected_before_decoding() {
    let mut store = MemoryStore::new();
    store.insert_blob(KEY, &png_bytes(), 1024);

    let cfg = AvatarConfig {
        max_bytes: 16,
        ..AvatarConfig::default()
    };
    let err = fetch_avatar(&store, KEY, &cfg).await.unwrap_err();
    assert!(matches!(err, ThumbnailError::Store(_)), "{err}");
    assert_eq!(store.downloads_opened(), 0);
}
