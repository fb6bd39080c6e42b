pub mod avatar;
pub mod decode;
pub mod fonts;

pub use avatar::fetch_avatar;
pub use decode::{InlineImage, transcode_to_jpeg};
pub use fonts::{FontFace, FontSet};
