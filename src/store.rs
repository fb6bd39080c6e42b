//! Document and blob store collaborators.
//!
//! The renderer only reads from these. `AssistantStore` resolves an [`AssistantId`] to its record;
//! `AvatarBucket` finds a blob by filename and streams its bytes.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::foundation::core::AssistantId;
use crate::foundation::error::ThumbnailResult;

pub mod fs;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use fs::FsStore;
pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

/// Chunked blob download. Avatars are stored under the assistant id (lowercase hex) as filename.
pub type ByteStream = BoxStream<'static, ThumbnailResult<Vec<u8>>>;

/// Read size used by the streaming backends.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantRecord {
    pub id: AssistantId,
    pub name: String,
    pub description: String,
    pub created_by_name: String,
}

/// Stored shape of an assistant document (camelCase, optional text fields).
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantDocument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

impl AssistantDocument {
    pub fn into_record(self, id: AssistantId) -> AssistantRecord {
        AssistantRecord {
            id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            created_by_name: self.created_by_name.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobHandle {
    /// Backend-specific blob identity.
    pub id: String,
    pub filename: String,
    /// Declared size in bytes, when the backend knows it.
    pub length: Option<u64>,
}

#[async_trait]
pub trait AssistantStore: Send + Sync {
    async fn find_one(&self, id: &AssistantId) -> ThumbnailResult<Option<AssistantRecord>>;
}

#[async_trait]
pub trait AvatarBucket: Send + Sync {
    async fn find_by_filename(&self, filename: &str) -> ThumbnailResult<Option<BlobHandle>>;

    async fn open_download_stream(&self, handle: &BlobHandle) -> ThumbnailResult<ByteStream>;
}
