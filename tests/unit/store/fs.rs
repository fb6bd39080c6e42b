use futures::TryStreamExt as _;

use super::*;

fn temp_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "assistant_thumbnail_fs_store_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(dir.join("assistants")).unwrap();
    std::fs::create_dir_all(dir.join("avatars")).unwrap();
    dir
}

const ID: &str = "507f1f77bcf86cd799439011";

#[tokio::test]
async fn find_one_reads_camel_case_document() {
    let root = temp_root("find_one");
    std::fs::write(
        root.join("assistants").join(format!("{ID}.json")),
        r#"{"name":"Helper","description":"A test assistant","createdByName":"Alice"}"#,
    )
    .unwrap();

    let store = FsStore::new(&root);
    let id = AssistantId::parse(ID).unwrap();
    let rec = store.find_one(&id).await.unwrap().unwrap();
    assert_eq!(rec.name, "Helper");
    assert_eq!(rec.description, "A test assistant");
    assert_eq!(rec.created_by_name, "Alice");
    assert_eq!(rec.id.to_string(), ID);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn find_one_missing_record_is_none_and_optional_fields_default() {
    let root = temp_root("optional");
    let store = FsStore::new(&root);
    let id = AssistantId::parse(ID).unwrap();
    assert!(store.find_one(&id).await.unwrap().is_none());

    std::fs::write(
        root.join("assistants").join(format!("{ID}.json")),
        r#"{"name":"Bare"}"#,
    )
    .unwrap();
    let rec = store.find_one(&id).await.unwrap().unwrap();
    assert_eq!(rec.description, "");
    assert_eq!(rec.created_by_name, "");

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn avatar_stream_yields_all_bytes_in_chunks() {
    let root = temp_root("stream");
    let bytes: Vec<u8> = (0..(CHUNK_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();
    std::fs::write(root.join("avatars").join(ID), &bytes).unwrap();

    let store = FsStore::new(&root);
    let handle = store.find_by_filename(ID).await.unwrap().unwrap();
    assert_eq!(handle.length, Some(bytes.len() as u64));

    let chunks: Vec<Vec<u8>> = store
        .open_download_stream(&handle)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks.concat(), bytes);

    assert!(store.find_by_filename("missing").await.unwrap().is_none());

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn blob_filenames_cannot_escape_the_avatar_dir() {
    let store = FsStore::new(std::env::temp_dir());
    for bad in ["../secret", "a/b", "..", "", "a\\b"] {
        let err = store.find_by_filename(bad).await.unwrap_err();
        assert!(matches!(err, ThumbnailError::Store(_)), "{bad}: {err}");
    }
}
