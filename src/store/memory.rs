use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt as _;

use crate::foundation::core::AssistantId;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::store::{AssistantRecord, AssistantStore, AvatarBucket, BlobHandle, ByteStream};

#[derive(Clone, Debug)]
struct MemoryBlob {
    chunks: Vec<Vec<u8>>,
    /// Yield an error after this many chunks instead of finishing.
    fail_after: Option<usize>,
}

/// In-process store for tests and local demos.
///
/// Populate it before sharing; reads never mutate the contents.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<AssistantId, AssistantRecord>,
    blobs: HashMap<String, MemoryBlob>,
    lookup_delay: Option<Duration>,
    downloads_opened: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_assistant(&mut self, record: AssistantRecord) -> &mut Self {
        self.records.insert(record.id, record);
        self
    }

    /// Store `bytes` as a blob named `filename`, served in chunks of `chunk_size`.
    pub fn insert_blob(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        chunk_size: usize,
    ) -> &mut Self {
        self.put_blob(filename.into(), bytes, chunk_size, None)
    }

    /// Store a blob whose download fails after yielding `good_chunks` chunks of `chunk_size`.
    pub fn insert_failing_blob(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        chunk_size: usize,
        good_chunks: usize,
    ) -> &mut Self {
        self.put_blob(filename.into(), bytes, chunk_size, Some(good_chunks))
    }

    fn put_blob(
        &mut self,
        filename: String,
        bytes: &[u8],
        chunk_size: usize,
        fail_after: Option<usize>,
    ) -> &mut Self {
        let chunks = bytes
            .chunks(chunk_size.max(1))
            .map(|c| c.to_vec())
            .collect();
        self.blobs.insert(filename, MemoryBlob { chunks, fail_after });
        self
    }

    /// Delay every record lookup, to exercise request timeouts.
    pub fn with_lookup_delay(&mut self, delay: Duration) -> &mut Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub fn downloads_opened(&self) -> usize {
        self.downloads_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantStore for MemoryStore {
    async fn find_one(&self, id: &AssistantId) -> ThumbnailResult<Option<AssistantRecord>> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.records.get(id).cloned())
    }
}

#[async_trait]
impl AvatarBucket for MemoryStore {
    async fn find_by_filename(&self, filename: &str) -> ThumbnailResult<Option<BlobHandle>> {
        Ok(self.blobs.get(filename).map(|b| BlobHandle {
            id: filename.to_owned(),
            filename: filename.to_owned(),
            length: Some(b.chunks.iter().map(|c| c.len() as u64).sum()),
        }))
    }

    async fn open_download_stream(&self, handle: &BlobHandle) -> ThumbnailResult<ByteStream> {
        let blob = self
            .blobs
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| ThumbnailError::store(format!("blob '{}' vanished", handle.id)))?;
        self.downloads_opened.fetch_add(1, Ordering::SeqCst);

        let items: Vec<ThumbnailResult<Vec<u8>>> = match blob.fail_after {
            None => blob.chunks.into_iter().map(Ok).collect(),
            Some(n) => blob
                .chunks
                .into_iter()
                .take(n)
                .map(Ok)
                .chain(std::iter::once(Err(ThumbnailError::store(
                    "connection reset while streaming blob",
                ))))
                .collect(),
        };
        Ok(futures::stream::iter(items).boxed())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/memory.rs"]
mod tests;
