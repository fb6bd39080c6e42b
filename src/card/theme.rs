//! Design tokens shared by every card.

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};

/// Root font size the rem-based scale is expressed against.
pub const REM_PX: f32 = 16.0;

/// Named 500-shade palette colors selectable as the primary color.
const PALETTE_500: &[(&str, Rgba8)] = &[
    ("slate", Rgba8::rgb(0x64, 0x74, 0x8b)),
    ("gray", Rgba8::rgb(0x6b, 0x72, 0x80)),
    ("zinc", Rgba8::rgb(0x71, 0x71, 0x7a)),
    ("neutral", Rgba8::rgb(0x73, 0x73, 0x73)),
    ("stone", Rgba8::rgb(0x78, 0x71, 0x6c)),
    ("red", Rgba8::rgb(0xef, 0x44, 0x44)),
    ("orange", Rgba8::rgb(0xf9, 0x73, 0x16)),
    ("amber", Rgba8::rgb(0xf5, 0x9e, 0x0b)),
    ("yellow", Rgba8::rgb(0xea, 0xb3, 0x08)),
    ("lime", Rgba8::rgb(0x84, 0xcc, 0x16)),
    ("green", Rgba8::rgb(0x22, 0xc5, 0x5e)),
    ("emerald", Rgba8::rgb(0x10, 0xb9, 0x81)),
    ("teal", Rgba8::rgb(0x14, 0xb8, 0xa6)),
    ("cyan", Rgba8::rgb(0x06, 0xb6, 0xd4)),
    ("sky", Rgba8::rgb(0x0e, 0xa5, 0xe9)),
    ("blue", Rgba8::rgb(0x3b, 0x82, 0xf6)),
    ("indigo", Rgba8::rgb(0x63, 0x66, 0xf1)),
    ("violet", Rgba8::rgb(0x8b, 0x5c, 0xf6)),
    ("purple", Rgba8::rgb(0xa8, 0x55, 0xf7)),
    ("fuchsia", Rgba8::rgb(0xd9, 0x46, 0xef)),
    ("pink", Rgba8::rgb(0xec, 0x48, 0x99)),
    ("rose", Rgba8::rgb(0xf4, 0x3f, 0x5e)),
];

/// Resolve a palette name (`"blue"`) or a hex color (`"#3b82f6"`).
pub fn resolve_color(name_or_hex: &str) -> ThumbnailResult<Rgba8> {
    let s = name_or_hex.trim();
    if let Some((_, c)) = PALETTE_500
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
    {
        return Ok(*c);
    }
    Rgba8::parse_hex(s).map_err(|_| {
        ThumbnailError::config(format!(
            "unknown color \"{s}\" (expected a palette name like \"blue\" or #RRGGBB)"
        ))
    })
}

/// Rem-based font size scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSize {
    Xxs,
    Xs,
    Sm,
    Smd,
    Base,
    Lg,
    Xl,
    X2l,
    X3l,
    X4l,
    X5l,
}

impl TextSize {
    pub fn rem(self) -> f32 {
        match self {
            TextSize::Xxs => 0.625,
            TextSize::Xs => 0.75,
            TextSize::Sm => 0.875,
            TextSize::Smd => 0.94,
            TextSize::Base => 1.0,
            TextSize::Lg => 1.125,
            TextSize::Xl => 1.25,
            TextSize::X2l => 1.5,
            TextSize::X3l => 1.875,
            TextSize::X4l => 2.25,
            TextSize::X5l => 3.0,
        }
    }

    pub fn px(self) -> f32 {
        self.rem() * REM_PX
    }
}

/// Colors and branding shared by every card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Creator pill background.
    pub primary: Rgba8,
    /// Card background.
    pub background: Rgba8,
    /// Default text color.
    pub foreground: Rgba8,
    /// Kicker line and footer.
    pub muted: Rgba8,
    /// Footer label ("Powered by ..."); no footer when `None`.
    #[serde(default)]
    pub brand: Option<String>,
}

impl Theme {
    /// Replace the accent with a palette name (`"emerald"`) or `#RRGGBB`.
    pub fn with_primary(mut self, name_or_hex: &str) -> ThumbnailResult<Self> {
        self.primary = resolve_color(name_or_hex)?;
        Ok(self)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Rgba8::rgb(0x3b, 0x82, 0xf6),
            background: Rgba8::BLACK,
            foreground: Rgba8::WHITE,
            // gray-400
            muted: Rgba8::rgb(0x9c, 0xa3, 0xaf),
            brand: None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/theme.rs"]
mod tests;
