use futures::StreamExt as _;

use crate::assets::decode::{InlineImage, transcode_to_jpeg};
use crate::config::AvatarConfig;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::store::AvatarBucket;

/// Find the blob named `key`, stream it into memory and transcode it into an inline JPEG.
///
/// A missing blob is `Ok(None)`. Stream failures are [`ThumbnailError::Store`], undecodable bytes
/// are [`ThumbnailError::Transcode`]; the caller decides whether those are fatal.
#[tracing::instrument(level = "debug", skip(bucket, cfg))]
pub async fn fetch_avatar(
    bucket: &dyn AvatarBucket,
    key: &str,
    cfg: &AvatarConfig,
) -> ThumbnailResult<Option<InlineImage>> {
    let Some(handle) = bucket.find_by_filename(key).await? else {
        tracing::debug!("no avatar blob");
        return Ok(None);
    };

    if let Some(len) = handle.length {
        if len > cfg.max_bytes as u64 {
            return Err(ThumbnailError::store(format!(
                "avatar blob is {len} bytes (max {})",
                cfg.max_bytes
            )));
        }
    }

    let mut stream = bucket.open_download_stream(&handle).await?;
    let mut bytes = Vec::with_capacity(handle.length.unwrap_or(0).min(cfg.max_bytes as u64) as usize);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > cfg.max_bytes {
            return Err(ThumbnailError::store(format!(
                "avatar blob exceeds {} bytes",
                cfg.max_bytes
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    tracing::debug!(bytes = bytes.len(), "streamed avatar blob");

    let max_px = cfg.max_px;
    let inline = tokio::task::spawn_blocking(move || transcode_to_jpeg(&bytes, max_px))
        .await
        .map_err(|e| ThumbnailError::transcode(format!("transcode task failed: {e}")))??;
    Ok(Some(inline))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/avatar.rs"]
mod tests;
