//! Request pipeline: lookup → avatar → template → compose → raster.

use std::sync::Arc;

use crate::assets::avatar::fetch_avatar;
use crate::assets::decode::InlineImage;
use crate::assets::fonts::FontSet;
use crate::card::{CardProps, render_card};
use crate::config::{AvatarErrorPolicy, RendererConfig};
use crate::foundation::core::AssistantId;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::render::compose::compose_svg;
use crate::render::raster::rasterize_png;
use crate::store::{AssistantStore, AvatarBucket};

/// Renders assistant thumbnails as PNG bytes.
///
/// Holds only immutable, shareable state; one instance serves all requests.
pub struct ThumbnailRenderer {
    assistants: Arc<dyn AssistantStore>,
    avatars: Arc<dyn AvatarBucket>,
    fonts: Arc<FontSet>,
    config: RendererConfig,
}

impl ThumbnailRenderer {
    pub fn new(
        assistants: Arc<dyn AssistantStore>,
        avatars: Arc<dyn AvatarBucket>,
        fonts: Arc<FontSet>,
        config: RendererConfig,
    ) -> Self {
        Self {
            assistants,
            avatars,
            fonts,
            config,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Render the thumbnail for `raw_id`.
    ///
    /// A malformed or unknown id is [`ThumbnailError::NotFound`]. The whole flow is bounded by
    /// [`RendererConfig::request_timeout`].
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn render(&self, raw_id: &str) -> ThumbnailResult<Vec<u8>> {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, self.render_inner(raw_id)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(?timeout, "thumbnail request timed out");
                Err(ThumbnailError::Timeout(timeout))
            }
        }
    }

    async fn render_inner(&self, raw_id: &str) -> ThumbnailResult<Vec<u8>> {
        let id = AssistantId::parse(raw_id)?;

        // The avatar key is the id itself, so the fetch can start before the lookup returns.
        let avatar_task = AbortOnDrop(tokio::spawn({
            let bucket = Arc::clone(&self.avatars);
            let key = id.to_string();
            let cfg = self.config.avatar.clone();
            async move { fetch_avatar(bucket.as_ref(), &key, &cfg).await }
        }));

        let record = self
            .assistants
            .find_one(&id)
            .await?
            .ok_or_else(|| ThumbnailError::not_found(format!("assistant {id}")))?;
        tracing::debug!(name = %record.name, "assistant found");

        let avatar = self.join_avatar(avatar_task).await?;
        let props = CardProps {
            name: &record.name,
            description: &record.description,
            created_by_name: &record.created_by_name,
            avatar: avatar.as_ref().map(|a| a.data_url.as_str()),
        };
        let card = render_card(&props, &self.config.theme);

        let fonts = Arc::clone(&self.fonts);
        let canvas = self.config.canvas;
        let png = tokio::task::spawn_blocking(move || {
            let doc = compose_svg(&card, canvas, &fonts)?;
            rasterize_png(&doc, fonts.fontdb())
        })
        .await
        .map_err(|e| ThumbnailError::render(format!("render task failed: {e}")))??;

        tracing::info!(bytes = png.len(), avatar = avatar.is_some(), "rendered thumbnail");
        Ok(png)
    }

    async fn join_avatar(
        &self,
        mut task: AbortOnDrop<ThumbnailResult<Option<InlineImage>>>,
    ) -> ThumbnailResult<Option<InlineImage>> {
        let result = match (&mut task.0).await {
            Ok(result) => result,
            Err(e) => Err(ThumbnailError::store(format!("avatar task failed: {e}"))),
        };
        match result {
            Ok(avatar) => Ok(avatar),
            Err(e)
                if e.is_avatar_recoverable()
                    && self.config.avatar.on_error == AvatarErrorPolicy::Degrade =>
            {
                tracing::warn!(error = %e, "rendering without avatar");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Aborts the wrapped task when dropped, so early returns and timeouts cancel the avatar fetch.
struct AbortOnDrop<T>(tokio::task::JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
