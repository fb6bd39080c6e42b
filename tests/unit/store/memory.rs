use super::*;
use futures::StreamExt as _;

const ID: &str = "507f1f77bcf86cd799439011";

async fn drain(store: &MemoryStore, filename: &str) -> (Vec<Vec<u8>>, Option<ThumbnailError>) {
    let handle = store.find_by_filename(filename).await.unwrap().unwrap();
    let mut stream = store.open_download_stream(&handle).await.unwrap();
    let mut chunks = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => chunks.push(chunk),
            Err(e) => return (chunks, Some(e)),
        }
    }
    (chunks, None)
}

#[tokio::test]
async fn blobs_stream_in_fixed_chunks() {
    let mut store = MemoryStore::new();
    store.insert_blob(ID, &[7u8; 10], 4);

    let handle = store.find_by_filename(ID).await.unwrap().unwrap();
    assert_eq!(handle.length, Some(10));
    let (chunks, err) = drain(&store, ID).await;
    assert!(err.is_none());
    assert_eq!(chunks.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 2]);
    assert_eq!(store.downloads_opened(), 1);
}

#[tokio::test]
async fn failing_blob_yields_only_the_good_chunks() {
    let mut store = MemoryStore::new();
    store.insert_failing_blob(ID, &[1u8; 100], 10, 3);

    let (chunks, err) = drain(&store, ID).await;
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 30);
    assert!(matches!(err, Some(ThumbnailError::Store(_))), "{err:?}");
}

#[tokio::test]
async fn missing_blob_and_record_are_none() {
    let store = MemoryStore::new();
    assert!(store.find_by_filename(ID).await.unwrap().is_none());
    let id = AssistantId::parse(ID).unwrap();
    assert!(store.find_one(&id).await.unwrap().is_none());
}
