pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

#[derive(thiserror::Error, Debug)]
pub enum ThumbnailError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("transcode error: {0}")]
    Transcode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("raster error: {0}")]
    Raster(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThumbnailError {
    /// Build a [`ThumbnailError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`ThumbnailError::Store`] value.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Build a [`ThumbnailError::Transcode`] value.
    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    /// Build a [`ThumbnailError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ThumbnailError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`ThumbnailError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this failure belongs to the optional avatar step and may be absorbed.
    pub fn is_avatar_recoverable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Transcode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
