use async_trait::async_trait;
use futures::{AsyncReadExt as _, StreamExt as _};
use mongodb::bson::{Bson, doc, oid::ObjectId};
use mongodb::gridfs::GridFsBucket;
use mongodb::{Client, Collection, Database};

use crate::foundation::core::AssistantId;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::store::{
    AssistantDocument, AssistantRecord, AssistantStore, AvatarBucket, BlobHandle, ByteStream,
    CHUNK_SIZE,
};

/// MongoDB backend: `assistants` collection plus the database's default GridFS bucket.
#[derive(Clone, Debug)]
pub struct MongoStore {
    assistants: Collection<AssistantDocument>,
    bucket: GridFsBucket,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> ThumbnailResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| ThumbnailError::config(format!("connect to mongodb: {e}")))?;
        tracing::info!(database, "connected to mongodb");
        Ok(Self::from_database(&client.database(database)))
    }

    pub fn from_database(db: &Database) -> Self {
        Self {
            assistants: db.collection("assistants"),
            bucket: db.gridfs_bucket(None),
        }
    }
}

fn object_id(id: &AssistantId) -> ObjectId {
    ObjectId::from_bytes(id.bytes())
}

#[async_trait]
impl AssistantStore for MongoStore {
    async fn find_one(&self, id: &AssistantId) -> ThumbnailResult<Option<AssistantRecord>> {
        let found = self
            .assistants
            .find_one(doc! { "_id": object_id(id) })
            .await
            .map_err(|e| ThumbnailError::store(format!("find assistant {id}: {e}")))?;
        Ok(found.map(|doc| doc.into_record(*id)))
    }
}

#[async_trait]
impl AvatarBucket for MongoStore {
    async fn find_by_filename(&self, filename: &str) -> ThumbnailResult<Option<BlobHandle>> {
        let Some(file) = self
            .bucket
            .find_one(doc! { "filename": filename })
            .await
            .map_err(|e| ThumbnailError::store(format!("find blob '{filename}': {e}")))?
        else {
            return Ok(None);
        };

        let Bson::ObjectId(oid) = file.id else {
            return Err(ThumbnailError::store(format!(
                "blob '{filename}' has a non-ObjectId _id"
            )));
        };
        Ok(Some(BlobHandle {
            id: oid.to_hex(),
            filename: file.filename.unwrap_or_else(|| filename.to_owned()),
            length: Some(file.length),
        }))
    }

    async fn open_download_stream(&self, handle: &BlobHandle) -> ThumbnailResult<ByteStream> {
        let oid = ObjectId::parse_str(&handle.id)
            .map_err(|e| ThumbnailError::store(format!("blob id '{}': {e}", handle.id)))?;
        let download = self
            .bucket
            .open_download_stream(Bson::ObjectId(oid))
            .await
            .map_err(|e| ThumbnailError::store(format!("open blob '{}': {e}", handle.id)))?;

        let stream = futures::stream::unfold(Some(download), |state| async move {
            let mut download = state?;
            let mut buf = vec![0u8; CHUNK_SIZE];
            match download.read(&mut buf).await {
                Ok(0) => None,
                Ok(n) => {
                    buf.truncate(n);
                    Some((Ok(buf), Some(download)))
                }
                Err(e) => Some((Err(ThumbnailError::store(format!("read blob: {e}"))), None)),
            }
        });
        Ok(stream.boxed())
    }
}
