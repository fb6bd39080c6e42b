//! Vector composition and rasterization of card trees.

pub mod compose;
pub mod raster;
pub mod text;

pub use compose::{Paint, SvgDocument, compose_svg, emit_svg, layout_paints};
pub use raster::rasterize_png;
pub use text::{ShapedLine, ShapedText, TextLayoutEngine};
