#![forbid(unsafe_code)]
//! Open Graph thumbnails for chat assistants.
//!
//! `GET /assistant/{id}/thumbnail.png` looks the assistant up, fetches its avatar (if any),
//! builds a card tree, lays it out as SVG and rasterizes it to a 1200x648 PNG:
//!
//! ```text
//! store lookup ─┐
//!               ├─> card template ─> compose (taffy + parley) ─> raster (resvg) ─> PNG
//! avatar fetch ─┘
//! ```

pub mod assets;
pub mod card;
pub mod config;
pub mod foundation;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod store;

pub use assets::{FontFace, FontSet, InlineImage};
pub use card::{CardProps, CardTree, Theme, render_card};
pub use config::{AvatarConfig, AvatarErrorPolicy, RendererConfig};
pub use foundation::core::{AssistantId, Canvas, Rgba8};
pub use foundation::error::{ThumbnailError, ThumbnailResult};
pub use pipeline::ThumbnailRenderer;
pub use render::{SvgDocument, compose_svg, rasterize_png};
pub use server::{AppState, create_router, serve};
pub use store::{AssistantRecord, AssistantStore, AvatarBucket, FsStore, MemoryStore};
#[cfg(feature = "mongodb")]
pub use store::MongoStore;
