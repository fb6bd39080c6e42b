use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use futures::StreamExt as _;
use tokio::io::AsyncReadExt as _;

use crate::foundation::core::AssistantId;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::store::{
    AssistantDocument, AssistantRecord, AssistantStore, AvatarBucket, BlobHandle, ByteStream,
    CHUNK_SIZE,
};

/// Directory-backed store.
///
/// ```text
/// <root>/assistants/<id>.json   {"name": .., "description": .., "createdByName": ..}
/// <root>/avatars/<filename>     raw image bytes
/// ```
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &AssistantId) -> PathBuf {
        self.root.join("assistants").join(format!("{id}.json"))
    }

    fn avatar_path(&self, filename: &str) -> ThumbnailResult<PathBuf> {
        validate_blob_filename(filename)?;
        Ok(self.root.join("avatars").join(filename))
    }
}

/// Blob filenames are single path segments.
pub(crate) fn validate_blob_filename(filename: &str) -> ThumbnailResult<()> {
    if filename.is_empty() {
        return Err(ThumbnailError::store("blob filename must be non-empty"));
    }
    if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
        return Err(ThumbnailError::store(format!(
            "blob filename '{filename}' must be a single path segment"
        )));
    }
    Ok(())
}

#[async_trait]
impl AssistantStore for FsStore {
    async fn find_one(&self, id: &AssistantId) -> ThumbnailResult<Option<AssistantRecord>> {
        let path = self.record_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ThumbnailError::store(format!(
                    "read '{}': {e}",
                    path.display()
                )));
            }
        };
        let doc: AssistantDocument = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse assistant document '{}'", path.display()))?;
        Ok(Some(doc.into_record(*id)))
    }
}

#[async_trait]
impl AvatarBucket for FsStore {
    async fn find_by_filename(&self, filename: &str) -> ThumbnailResult<Option<BlobHandle>> {
        let path = self.avatar_path(filename)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(BlobHandle {
                id: filename.to_owned(),
                filename: filename.to_owned(),
                length: Some(meta.len()),
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ThumbnailError::store(format!(
                "stat '{}': {e}",
                path.display()
            ))),
        }
    }

    async fn open_download_stream(&self, handle: &BlobHandle) -> ThumbnailResult<ByteStream> {
        let path = self.avatar_path(&handle.id)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| ThumbnailError::store(format!("open '{}': {e}", path.display())))?;

        let stream = futures::stream::unfold(Some(file), |state| async move {
            let mut file = state?;
            let mut buf = vec![0u8; CHUNK_SIZE];
            match file.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(buf), Some(file)))
                }
                Err(e) => Some((Err(ThumbnailError::store(format!("read blob: {e}"))), None)),
            }
        });
        Ok(stream.boxed())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/fs.rs"]
mod tests;
